use thiserror::Error;

/// Failures when turning text into engine values.
///
/// The rules engine itself never fails: bad clicks, illegal moves and empty
/// undo stacks are handled as no-ops. These errors only come out of parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),

    #[error("invalid computer level: {0}")]
    InvalidLevel(String),

    #[error("invalid game mode: {0}")]
    InvalidMode(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("missing value for {0}")]
    MissingValue(String),
}
