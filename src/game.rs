use std::fmt;

use tracing::{debug, info};

use crate::board::{Board, Color, Piece, PieceType, Square};
use crate::movegen::{GameState, Move, MoveGenerator};
use crate::notation::render_move;

/// One entry of the undo log. Holds everything needed to put the board,
/// the side to move and the move counter back as they were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    /// The piece as it stood on the origin square, before any promotion.
    pub moved_piece: Piece,
    pub captured_piece: Option<Piece>,
    pub notation: String,
    pub side_before: Color,
    pub move_count_before: u32,
    pub promotion: Option<PieceType>,
}

impl MoveRecord {
    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveAttempt {
    /// The move was played and the turn passed to the other side.
    Applied(MoveRecord),
    /// The move was played and a pawn reached its last row. The turn passes
    /// once `Game::promote` is called for the destination square.
    PromotionPending(MoveRecord),
    /// The target is not a legal destination for the selection.
    Rejected,
    /// No selection, or the game is not accepting input.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Checkmate { winner: Color },
    Stalemate,
    Resignation { winner: Color },
    DrawAgreed,
    Timeout { winner: Color },
}

impl GameOutcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameOutcome::Checkmate { winner }
            | GameOutcome::Resignation { winner }
            | GameOutcome::Timeout { winner } => Some(*winner),
            GameOutcome::Stalemate | GameOutcome::DrawAgreed => None,
        }
    }

    /// Outcomes read off the board, as opposed to ones signalled by a player
    /// or a clock.
    pub fn is_positional(&self) -> bool {
        matches!(self, GameOutcome::Checkmate { .. } | GameOutcome::Stalemate)
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameOutcome::Checkmate { winner } => write!(f, "Checkmate! {} wins.", winner),
            GameOutcome::Stalemate => write!(f, "Stalemate! The game is a draw."),
            GameOutcome::Resignation { winner } => write!(f, "{} wins by resignation.", winner),
            GameOutcome::DrawAgreed => write!(f, "Draw by Agreement."),
            GameOutcome::Timeout { winner } => write!(f, "{} wins on time!", winner),
        }
    }
}

/// The selected piece and where it may go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub square: Square,
    pub piece: Piece,
    pub legal_moves: Vec<Move>,
}

/// A game in progress: the board plus turn, history and selection state.
///
/// Every method is a plain call that returns its result; nothing here calls
/// back into the presentation layer.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    generator: MoveGenerator,
    side_to_move: Color,
    move_count: u32,
    is_game_over: bool,
    is_paused: bool,
    outcome: Option<GameOutcome>,
    history: Vec<MoveRecord>,
    selection: Option<Selection>,
    pending_promotion: Option<Square>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_position(Board::new(), Color::White)
    }

    /// Starts from an arbitrary board. Handy for set positions and tests.
    pub fn from_position(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            generator: MoveGenerator::new(),
            side_to_move,
            move_count: 1,
            is_game_over: false,
            is_paused: false,
            outcome: None,
            history: Vec::new(),
            selection: None,
            pending_promotion: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending_promotion
    }

    /// The piece taken by the most recent move and the side that took it.
    pub fn last_capture(&self) -> Option<(Piece, Color)> {
        self.history
            .last()
            .and_then(|r| r.captured_piece.map(|captured| (captured, r.moved_piece.color)))
    }

    /// Pieces `color` has taken so far, oldest first.
    pub fn captured_by(&self, color: Color) -> Vec<Piece> {
        self.history
            .iter()
            .filter(|r| r.moved_piece.color == color)
            .filter_map(|r| r.captured_piece)
            .collect()
    }

    fn accepts_input(&self) -> bool {
        !self.is_game_over && !self.is_paused && self.pending_promotion.is_none()
    }

    pub fn legal_moves(&self, square: Square) -> Vec<Move> {
        self.generator.generate_legal_moves(&self.board, square)
    }

    pub fn all_legal_moves(&self) -> Vec<Move> {
        self.generator.generate_all_legal_moves(&self.board, self.side_to_move)
    }

    pub fn is_king_in_check(&self, color: Color) -> bool {
        self.generator.is_king_in_check(&self.board, color)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.generator.is_checkmate(&self.board, color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        self.generator.is_stalemate(&self.board, color)
    }

    pub fn game_state(&self) -> GameState {
        self.generator.get_game_state(&self.board, self.side_to_move)
    }

    /// Selects the piece on `square` if it belongs to the side to move.
    /// Anything else is ignored and leaves the state untouched.
    pub fn select_square(&mut self, square: Square) -> bool {
        if !self.accepts_input() {
            return false;
        }
        match self.board.get(square) {
            Some(piece) if piece.color == self.side_to_move => {
                let legal_moves = self.legal_moves(square);
                self.selection = Some(Selection {
                    square,
                    piece,
                    legal_moves,
                });
                true
            }
            _ => false,
        }
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    /// Tries to move the selected piece to `target`. The selection is
    /// dropped whether or not the move is legal.
    pub fn attempt_move(&mut self, target: Square) -> MoveAttempt {
        if !self.accepts_input() {
            return MoveAttempt::Ignored;
        }
        let selection = match self.selection.take() {
            Some(selection) => selection,
            None => return MoveAttempt::Ignored,
        };

        let mv = Move::between(selection.square, target);
        if !selection.legal_moves.contains(&mv) {
            debug!("rejected {} -> {}", mv.from, mv.to);
            return MoveAttempt::Rejected;
        }

        let record = match self.apply_move(mv) {
            Some(record) => record,
            None => return MoveAttempt::Rejected,
        };

        if self.needs_promotion(target) {
            self.pending_promotion = Some(target);
            MoveAttempt::PromotionPending(record)
        } else {
            self.switch_player();
            MoveAttempt::Applied(record)
        }
    }

    /// Click handling: the first click selects, the second one tries to move.
    /// Returns `None` for a selecting click.
    pub fn handle_square_selection(&mut self, square: Square) -> Option<MoveAttempt> {
        if self.selection.is_none() {
            self.select_square(square);
            None
        } else {
            Some(self.attempt_move(square))
        }
    }

    /// Plays `mv` on the board and logs it. Legality is the caller's job, and
    /// so are the turn switch and promotion. Returns `None` when the origin
    /// square is empty.
    pub fn apply_move(&mut self, mv: Move) -> Option<MoveRecord> {
        let moved_piece = self.board.get(mv.from)?;
        let captured_piece = self.board.get(mv.to);
        let notation = render_move(&mv, moved_piece, captured_piece.is_some(), self.move_count);

        let record = MoveRecord {
            mv,
            moved_piece,
            captured_piece,
            notation,
            side_before: self.side_to_move,
            move_count_before: self.move_count,
            promotion: None,
        };
        self.history.push(record.clone());
        self.board.relocate(mv.from, mv.to);

        debug!("applied {}", record.notation);
        Some(record)
    }

    /// Hands the turn to the other side and checks whether it can still play.
    pub fn switch_player(&mut self) {
        if self.side_to_move == Color::Black {
            self.move_count += 1;
        }
        self.side_to_move = self.side_to_move.opposite();

        match self.game_state() {
            GameState::Checkmate(winner) => self.finish(GameOutcome::Checkmate { winner }),
            GameState::Stalemate => self.finish(GameOutcome::Stalemate),
            GameState::Check | GameState::Ongoing => {}
        }
    }

    /// Takes back the most recent move, restoring any captured piece and the
    /// piece that moved exactly as it was, pawn included after a promotion.
    pub fn undo_last_move(&mut self) -> Option<MoveRecord> {
        let record = self.history.pop()?;

        self.board.set(record.mv.from, Some(record.moved_piece));
        self.board.set(record.mv.to, record.captured_piece);
        self.side_to_move = record.side_before;
        self.move_count = record.move_count_before;
        self.selection = None;
        self.pending_promotion = None;

        if self.outcome.map_or(false, |o| o.is_positional()) {
            self.outcome = None;
            self.is_game_over = false;
        }

        debug!("undid {}", record.notation);
        Some(record)
    }

    pub fn needs_promotion(&self, square: Square) -> bool {
        match self.board.get(square) {
            Some(piece) => piece.kind == PieceType::Pawn && square.row == piece.color.promotion_row(),
            None => false,
        }
    }

    /// Replaces the pawn on `square` with `choice`, a queen when no usable
    /// choice is given. If the move that got it there is waiting on this
    /// promotion, the turn then passes. Returns the new piece, or `None` when
    /// there is no pawn to promote on `square`.
    pub fn promote(&mut self, square: Square, choice: Option<PieceType>) -> Option<Piece> {
        if !self.needs_promotion(square) {
            return None;
        }
        let color = self.board.get(square)?.color;
        let kind = choice
            .filter(|kind| kind.is_promotion_choice())
            .unwrap_or(PieceType::Queen);
        let promoted = Piece::new(kind, color);
        self.board.set(square, Some(promoted));

        if let Some(record) = self.history.last_mut() {
            if record.mv.to == square {
                record.promotion = Some(kind);
            }
        }

        if self.pending_promotion == Some(square) {
            self.pending_promotion = None;
            self.switch_player();
        }
        Some(promoted)
    }

    /// Flips the paused flag and returns the new value. The board is
    /// untouched; while paused, selections and moves are ignored.
    pub fn toggle_pause(&mut self) -> bool {
        self.is_paused = !self.is_paused;
        self.is_paused
    }

    /// The side to move gives up.
    pub fn resign(&mut self) -> bool {
        let winner = self.side_to_move.opposite();
        self.finish_if_open(GameOutcome::Resignation { winner })
    }

    pub fn accept_draw(&mut self) -> bool {
        self.finish_if_open(GameOutcome::DrawAgreed)
    }

    /// `loser` ran out of time.
    pub fn time_up(&mut self, loser: Color) -> bool {
        self.finish_if_open(GameOutcome::Timeout {
            winner: loser.opposite(),
        })
    }

    fn finish_if_open(&mut self, outcome: GameOutcome) -> bool {
        if self.is_game_over {
            return false;
        }
        self.finish(outcome);
        true
    }

    fn finish(&mut self, outcome: GameOutcome) {
        info!("{}", outcome);
        self.is_game_over = true;
        self.outcome = Some(outcome);
        self.selection = None;
    }
}
