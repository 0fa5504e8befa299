use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::{debug, warn};

use crate::board::{PieceType, Square};
use crate::config::GameConfig;
use crate::error::ChessError;
use crate::game::{Game, MoveAttempt};
use crate::notation::{parse_move, promotion_choice, square_name};
use crate::search::Opponent;

const HELP: &str = "\
commands:
  board                 show the board
  moves <sq>            legal destinations of the piece on <sq>
  click <sq>            select a piece, or move the selected one to <sq>
  move <from><to>[qrbn] play a move, optionally naming the promotion piece
  promote <piece>       finish a pending promotion (default queen)
  undo                  take back the last move
  history               list the moves played
  status                whose turn it is, or how the game ended
  pause                 pause or resume
  resign | draw         end the game
  timeout <color>       <color> ran out of time
  go                    let the computer play the side to move
  level <easy|medium|hard>
  new                   start over
  quit
";

/// Line based driver around a `Game`, used by the binary.
pub struct ConsoleHandler {
    game: Game,
    opponent: Opponent,
    config: GameConfig,
}

impl ConsoleHandler {
    pub fn new(config: GameConfig) -> Self {
        ConsoleHandler {
            game: Game::new(),
            opponent: Opponent::new(config.level),
            config,
        }
    }

    /// Uses a seeded opponent so that computer moves repeat.
    pub fn with_opponent(config: GameConfig, opponent: Opponent) -> Self {
        ConsoleHandler {
            game: Game::new(),
            opponent,
            config,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        write!(stdout, "{}", self.startup())?;
        stdout.flush()?;

        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }

            let response = self.handle_command(command)?;
            write!(stdout, "{}", response)?;
            stdout.flush()?;
            line.clear();
        }
        Ok(())
    }

    /// Greeting plus the computer's first move when it plays white.
    pub fn startup(&mut self) -> String {
        let mut out = format!("{}\n{}\n", self.game.board(), self.status_line());
        out.push_str(&self.computer_reply());
        out
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok("".to_string());
        }

        match self.execute(&parts) {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!("{}", e);
                Ok(format!("error: {}\n", e))
            }
        }
    }

    fn execute(&mut self, parts: &[&str]) -> Result<String, ChessError> {
        debug!("command {:?}", parts);
        match parts[0] {
            "help" => Ok(HELP.to_string()),
            "board" => Ok(format!("{}\n{}\n", self.game.board(), self.status_line())),
            "moves" => {
                let square = parse_square_arg(parts)?;
                Ok(self.handle_moves(square))
            }
            "click" => {
                let square = parse_square_arg(parts)?;
                Ok(self.handle_click(square))
            }
            "move" => {
                let text = parts.get(1).ok_or_else(|| ChessError::InvalidMove("".to_string()))?;
                self.handle_move(text)
            }
            "promote" => Ok(self.handle_promote(parts.get(1).copied())),
            "undo" => Ok(self.handle_undo()),
            "history" => Ok(self.history_line()),
            "status" => Ok(format!("{}\n", self.status_line())),
            "pause" => {
                self.game.toggle_pause();
                Ok(format!("{}\n", self.status_line()))
            }
            "resign" => {
                self.game.resign();
                Ok(format!("{}\n", self.status_line()))
            }
            "draw" => {
                self.game.accept_draw();
                Ok(format!("{}\n", self.status_line()))
            }
            "timeout" => {
                let text = parts.get(1).ok_or_else(|| ChessError::InvalidColor("".to_string()))?;
                self.game.time_up(text.parse()?);
                Ok(format!("{}\n", self.status_line()))
            }
            "go" => Ok(self.play_computer_move()),
            "level" => {
                let text = parts.get(1).ok_or_else(|| ChessError::InvalidLevel("".to_string()))?;
                self.opponent.set_level(text.parse()?);
                Ok(format!("level {}\n", self.opponent.level()))
            }
            "new" => {
                self.game = Game::new();
                Ok(self.startup())
            }
            other => Ok(format!("unknown command: {}\n", other)),
        }
    }

    fn handle_moves(&self, square: Square) -> String {
        let moves = self.game.legal_moves(square);
        if moves.is_empty() {
            return "none\n".to_string();
        }
        let targets: Vec<String> = moves.iter().map(|mv| square_name(mv.to)).collect();
        format!("{}\n", targets.join(" "))
    }

    fn handle_click(&mut self, square: Square) -> String {
        match self.game.handle_square_selection(square) {
            None => match self.game.selection() {
                Some(selection) => format!(
                    "selected {} ({} moves)\n",
                    square_name(selection.square),
                    selection.legal_moves.len()
                ),
                None => "ignored\n".to_string(),
            },
            Some(attempt) => self.describe_attempt(attempt, None),
        }
    }

    fn handle_move(&mut self, text: &str) -> Result<String, ChessError> {
        let (mv, promotion) = parse_move(text)?;
        if !self.game.select_square(mv.from) {
            return Err(ChessError::InvalidMove(text.to_string()));
        }
        match self.game.attempt_move(mv.to) {
            MoveAttempt::Rejected | MoveAttempt::Ignored => Err(ChessError::InvalidMove(text.to_string())),
            attempt => Ok(self.describe_attempt(attempt, promotion)),
        }
    }

    fn handle_promote(&mut self, choice: Option<&str>) -> String {
        let square = match self.game.pending_promotion() {
            Some(square) => square,
            None => return "no promotion pending\n".to_string(),
        };
        let kind = promotion_choice(choice);
        self.finish_promotion(square, kind)
    }

    fn finish_promotion(&mut self, square: Square, kind: PieceType) -> String {
        let mut out = match self.game.promote(square, Some(kind)) {
            Some(piece) => format!("promoted to {:?} on {}\n", piece.kind, square_name(square)),
            None => "no promotion pending\n".to_string(),
        };
        out.push_str(&format!("{}\n", self.status_line()));
        out.push_str(&self.computer_reply());
        out
    }

    fn describe_attempt(&mut self, attempt: MoveAttempt, promotion: Option<PieceType>) -> String {
        match attempt {
            MoveAttempt::Applied(record) => {
                let mut out = format!("{}\n{}\n", record.notation, self.status_line());
                out.push_str(&self.computer_reply());
                out
            }
            MoveAttempt::PromotionPending(record) => {
                let mut out = format!("{}\n", record.notation);
                match promotion {
                    Some(kind) => out.push_str(&self.finish_promotion(record.mv.to, kind)),
                    None => out.push_str("promote: queen, rook, bishop or knight\n"),
                }
                out
            }
            MoveAttempt::Rejected => "illegal move\n".to_string(),
            MoveAttempt::Ignored => "ignored\n".to_string(),
        }
    }

    fn handle_undo(&mut self) -> String {
        match self.game.undo_last_move() {
            Some(record) => format!("undone {}\n{}\n", record.notation, self.status_line()),
            None => "nothing to undo\n".to_string(),
        }
    }

    /// Plays for the side to move whatever the mode, promoting to a queen.
    fn play_computer_move(&mut self) -> String {
        let mv = match self.opponent.choose_move(&self.game) {
            Some(mv) => mv,
            None => return "no move\n".to_string(),
        };
        if !self.game.select_square(mv.from) {
            return "no move\n".to_string();
        }
        match self.game.attempt_move(mv.to) {
            MoveAttempt::Applied(record) => format!("{}\n{}\n", record.notation, self.status_line()),
            MoveAttempt::PromotionPending(record) => {
                self.game.promote(mv.to, Some(PieceType::Queen));
                format!("{}\n{}\n", record.notation, self.status_line())
            }
            MoveAttempt::Rejected | MoveAttempt::Ignored => "no move\n".to_string(),
        }
    }

    fn computer_reply(&mut self) -> String {
        if self.game.is_game_over()
            || self.game.is_paused()
            || !self.config.is_computer_turn(self.game.side_to_move())
        {
            return "".to_string();
        }
        self.play_computer_move()
    }

    fn history_line(&self) -> String {
        if self.game.history().is_empty() {
            return "No moves yet.\n".to_string();
        }
        let moves: Vec<&str> = self.game.history().iter().map(|r| r.notation.as_str()).collect();
        format!("{}\n", moves.join(" "))
    }

    fn status_line(&self) -> String {
        if let Some(outcome) = self.game.outcome() {
            return outcome.to_string();
        }
        if self.game.is_paused() {
            return "Game Paused".to_string();
        }
        let side = self.game.side_to_move();
        if self.game.is_king_in_check(side) {
            format!("{}'s Turn (check)", side)
        } else {
            format!("{}'s Turn", side)
        }
    }
}

fn parse_square_arg(parts: &[&str]) -> Result<Square, ChessError> {
    parts
        .get(1)
        .ok_or_else(|| ChessError::InvalidSquare("".to_string()))?
        .parse()
}
