//! Computer opponent. It reads the live game but only ever plays moves on
//! its own copy of the board.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::board::{Board, Color, Piece, PieceType};
use crate::error::ChessError;
use crate::evaluation::Evaluator;
use crate::game::Game;
use crate::movegen::{Move, MoveGenerator};

const MATE_SCORE: i32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    /// Any legal move.
    Easy,
    /// Best material after its own move.
    #[default]
    Medium,
    /// Looks at the reply as well.
    Hard,
}

impl Level {
    fn depth(&self) -> u32 {
        match self {
            Level::Easy => 0,
            Level::Medium => 1,
            Level::Hard => 2,
        }
    }
}

impl FromStr for Level {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Level::Easy),
            "medium" => Ok(Level::Medium),
            "hard" => Ok(Level::Hard),
            _ => Err(ChessError::InvalidLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Level::Easy => write!(f, "Easy"),
            Level::Medium => write!(f, "Medium"),
            Level::Hard => write!(f, "Hard"),
        }
    }
}

pub struct Opponent {
    level: Level,
    evaluator: Evaluator,
    move_generator: MoveGenerator,
    rng: StdRng,
    nodes_searched: u64,
}

impl Opponent {
    pub fn new(level: Level) -> Self {
        Self::with_rng(level, StdRng::from_entropy())
    }

    /// Same choices for the same seed, for reproducible games and tests.
    pub fn with_seed(level: Level, seed: u64) -> Self {
        Self::with_rng(level, StdRng::seed_from_u64(seed))
    }

    fn with_rng(level: Level, rng: StdRng) -> Self {
        Self {
            level,
            evaluator: Evaluator::new(),
            move_generator: MoveGenerator::new(),
            rng,
            nodes_searched: 0,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    /// Picks a move for the side to move, or `None` when it has none or the
    /// game is already decided. Equal scores are broken at random.
    pub fn choose_move(&mut self, game: &Game) -> Option<Move> {
        if game.is_game_over() {
            return None;
        }
        let board = game.board().clone();
        let color = game.side_to_move();
        let moves = self.move_generator.generate_all_legal_moves(&board, color);
        if moves.is_empty() {
            return None;
        }

        self.nodes_searched = 0;
        let depth = self.level.depth();
        if depth == 0 {
            return moves.choose(&mut self.rng).copied();
        }

        let mut best_score = i32::MIN;
        let mut best_moves = Vec::new();
        for mv in moves {
            let child = play(&board, mv);
            let score = -self.negamax(&child, color.opposite(), depth - 1);
            if score > best_score {
                best_score = score;
                best_moves.clear();
            }
            if score == best_score {
                best_moves.push(mv);
            }
        }

        debug!(
            "{} level searched {} nodes, best score {}",
            self.level, self.nodes_searched, best_score
        );
        best_moves.choose(&mut self.rng).copied()
    }

    fn negamax(&mut self, board: &Board, color: Color, depth: u32) -> i32 {
        self.nodes_searched += 1;

        if depth == 0 {
            return self.evaluator.evaluate(board, color);
        }

        let moves = self.move_generator.generate_all_legal_moves(board, color);
        if moves.is_empty() {
            return if self.move_generator.is_king_in_check(board, color) {
                -MATE_SCORE
            } else {
                0
            };
        }

        let mut best_score = -MATE_SCORE;
        for mv in moves {
            let child = play(board, mv);
            let score = -self.negamax(&child, color.opposite(), depth - 1);
            best_score = best_score.max(score);
        }
        best_score
    }
}

/// The position after `mv`, with a pawn on its last row turned into a queen.
fn play(board: &Board, mv: Move) -> Board {
    let mut board_copy = board.clone();
    board_copy.relocate(mv.from, mv.to);
    if let Some(piece) = board_copy.get(mv.to) {
        if piece.kind == PieceType::Pawn && mv.to.row == piece.color.promotion_row() {
            board_copy.set(mv.to, Some(Piece::new(PieceType::Queen, piece.color)));
        }
    }
    board_copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn place(board: &mut Board, name: &str, kind: PieceType, color: Color) {
        board.set(sq(name), Some(Piece::new(kind, color)));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("Easy".parse::<Level>(), Ok(Level::Easy));
        assert_eq!("hard".parse::<Level>(), Ok(Level::Hard));
        assert!("grandmaster".parse::<Level>().is_err());
        assert_eq!(Level::default(), Level::Medium);
    }

    #[test]
    fn test_every_level_returns_legal_move() {
        let game = Game::new();
        let legal = game.all_legal_moves();
        for level in [Level::Easy, Level::Medium, Level::Hard] {
            let mut opponent = Opponent::with_seed(level, 7);
            let mv = opponent.choose_move(&game).unwrap();
            assert!(legal.contains(&mv), "{} chose {:?}", level, mv);
        }
        assert_eq!(game.board(), &Board::new());
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_medium_takes_hanging_queen() {
        let mut board = Board::empty();
        place(&mut board, "a1", PieceType::Rook, Color::White);
        place(&mut board, "a5", PieceType::Queen, Color::Black);
        place(&mut board, "h1", PieceType::King, Color::White);
        place(&mut board, "h8", PieceType::King, Color::Black);
        let game = Game::from_position(board, Color::White);

        let mut opponent = Opponent::with_seed(Level::Medium, 1);
        assert_eq!(opponent.choose_move(&game), Some(Move::between(sq("a1"), sq("a5"))));
    }

    #[test]
    fn test_hard_finds_mate_in_one() {
        let mut board = Board::empty();
        place(&mut board, "g8", PieceType::King, Color::Black);
        place(&mut board, "f7", PieceType::Pawn, Color::Black);
        place(&mut board, "g7", PieceType::Pawn, Color::Black);
        place(&mut board, "h7", PieceType::Pawn, Color::Black);
        place(&mut board, "a1", PieceType::Rook, Color::White);
        place(&mut board, "g1", PieceType::King, Color::White);
        let game = Game::from_position(board, Color::White);

        let mut opponent = Opponent::with_seed(Level::Hard, 3);
        assert_eq!(opponent.choose_move(&game), Some(Move::between(sq("a1"), sq("a8"))));
    }

    #[test]
    fn test_no_move_when_game_over() {
        let mut game = Game::new();
        game.resign();
        let mut opponent = Opponent::with_seed(Level::Easy, 0);
        assert_eq!(opponent.choose_move(&game), None);
    }

    #[test]
    fn test_same_seed_same_choice() {
        let game = Game::new();
        let first = Opponent::with_seed(Level::Easy, 42).choose_move(&game);
        let second = Opponent::with_seed(Level::Easy, 42).choose_move(&game);
        assert_eq!(first, second);
    }
}
