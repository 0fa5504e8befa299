pub mod board;
pub mod config;
pub mod console;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod movegen;
pub mod notation;
pub mod search;

pub use board::{Board, Color, Piece, PieceType, Square};
pub use error::ChessError;
pub use game::{Game, GameOutcome, MoveAttempt, MoveRecord};
pub use movegen::{GameState, Move, MoveGenerator};
