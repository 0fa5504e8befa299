//! Square names and the short move labels kept in the game history.
//!
//! Labels look like `1. e2-e4`, `Ng8-f6` or `3. Bf1xb5`: a move number before
//! white's moves, the piece letter, origin, `x` or `-`, destination. There is no
//! disambiguation and no check suffix.

use std::fmt;
use std::str::FromStr;

use crate::board::{Color, Piece, PieceType, Square};
use crate::error::ChessError;
use crate::movegen::Move;

/// File letter followed by rank digit, rank = 8 - row.
pub fn square_name(square: Square) -> String {
    let file = (b'a' + square.col) as char;
    let rank = (b'8' - square.row) as char;
    format!("{}{}", file, rank)
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", square_name(*self))
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        Ok(Square::new(b'8' - rank, file - b'a'))
    }
}

impl FromStr for PieceType {
    type Err = ChessError;

    /// Accepts promotion targets by name or letter, e.g. `Knight`, `n`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queen" | "q" => Ok(PieceType::Queen),
            "rook" | "r" => Ok(PieceType::Rook),
            "bishop" | "b" => Ok(PieceType::Bishop),
            "knight" | "n" => Ok(PieceType::Knight),
            _ => Err(ChessError::InvalidPromotion(s.to_string())),
        }
    }
}

impl FromStr for Color {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            _ => Err(ChessError::InvalidColor(s.to_string())),
        }
    }
}

/// Promotion choice as supplied by a chooser. Missing or unrecognised
/// choices fall back to a queen.
pub fn promotion_choice(choice: Option<&str>) -> PieceType {
    choice
        .and_then(|c| c.parse::<PieceType>().ok())
        .unwrap_or(PieceType::Queen)
}

/// Label for a move, computed from the board before the move is made.
pub fn render_move(mv: &Move, moved: Piece, is_capture: bool, move_number: u32) -> String {
    let mut label = String::new();
    if moved.color == Color::White {
        label.push_str(&format!("{}. ", move_number));
    }
    if let Some(letter) = moved.kind.letter() {
        label.push(letter);
    }
    label.push_str(&square_name(mv.from));
    label.push(if is_capture { 'x' } else { '-' });
    label.push_str(&square_name(mv.to));
    label
}

/// Parses coordinate input such as `e2e4`, `e2-e4` or `a7a8n`.
/// The optional trailing letter is a promotion choice.
pub fn parse_move(input: &str) -> Result<(Move, Option<PieceType>), ChessError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != '-').collect();
    if (cleaned.len() != 4 && cleaned.len() != 5) || !cleaned.is_ascii() {
        return Err(ChessError::InvalidMove(input.to_string()));
    }

    let from: Square = cleaned[0..2]
        .parse()
        .map_err(|_| ChessError::InvalidMove(input.to_string()))?;
    let to: Square = cleaned[2..4]
        .parse()
        .map_err(|_| ChessError::InvalidMove(input.to_string()))?;
    let promotion = if cleaned.len() == 5 {
        Some(cleaned[4..].parse::<PieceType>()?)
    } else {
        None
    };

    Ok((Move { from, to }, promotion))
}
