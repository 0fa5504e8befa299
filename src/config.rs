use std::str::FromStr;

use crate::board::Color;
use crate::error::ChessError;
use crate::search::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Both sides are played from the console.
    #[default]
    Human,
    /// One side is played by the computer.
    Computer,
}

impl FromStr for GameMode {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(GameMode::Human),
            "ai" | "computer" => Ok(GameMode::Computer),
            _ => Err(ChessError::InvalidMode(s.to_string())),
        }
    }
}

/// Startup settings for the console driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub mode: GameMode,
    pub level: Level,
    pub computer_color: Color,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Human,
            level: Level::Medium,
            computer_color: Color::Black,
        }
    }
}

impl GameConfig {
    /// Reads `--mode`, `--level` and `--computer` flags. The program name
    /// must already be stripped.
    pub fn from_args<I>(args: I) -> Result<Self, ChessError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = GameConfig::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--mode" => config.mode = next_value(&mut args, &flag)?.parse()?,
                "--level" => config.level = next_value(&mut args, &flag)?.parse()?,
                "--computer" => {
                    config.computer_color = next_value(&mut args, &flag)?.parse()?;
                    config.mode = GameMode::Computer;
                }
                _ => return Err(ChessError::UnknownOption(flag)),
            }
        }
        Ok(config)
    }

    pub fn is_computer_turn(&self, side_to_move: Color) -> bool {
        self.mode == GameMode::Computer && side_to_move == self.computer_color
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ChessError> {
    args.next()
        .ok_or_else(|| ChessError::MissingValue(flag.to_string()))
}
