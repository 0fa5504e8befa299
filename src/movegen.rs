use crate::board::{Board, Color, Piece, PieceType, Square};

/// A from/to pair. Captures and promotions are read off the board when the
/// move is made, so two moves are equal exactly when their squares are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(start_row: u8, start_col: u8, end_row: u8, end_col: u8) -> Self {
        Self {
            from: Square::new(start_row, start_col),
            to: Square::new(end_row, end_col),
        }
    }

    pub fn between(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Ongoing,
    Check,
    /// Carries the winning side.
    Checkmate(Color),
    Stalemate,
}

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2), (1, -2), (-1, 2), (-1, -2),
    (2, 1), (2, -1), (-2, 1), (-2, -1),
];
const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Every move the piece on `square` could make, ignoring whether it
    /// leaves its own king attacked. An empty square yields nothing.
    pub fn generate_pseudo_moves(&self, board: &Board, square: Square) -> Vec<Move> {
        let mut moves = Vec::new();
        let piece = match board.get(square) {
            Some(piece) => piece,
            None => return moves,
        };

        match piece.kind {
            PieceType::Pawn => self.add_pawn_moves(&mut moves, board, piece, square),
            PieceType::Knight => self.add_step_moves(&mut moves, board, piece, square, &KNIGHT_JUMPS),
            PieceType::Bishop => self.add_sliding_moves(&mut moves, board, piece, square, &DIAGONAL),
            PieceType::Rook => self.add_sliding_moves(&mut moves, board, piece, square, &ORTHOGONAL),
            PieceType::Queen => {
                self.add_sliding_moves(&mut moves, board, piece, square, &ORTHOGONAL);
                self.add_sliding_moves(&mut moves, board, piece, square, &DIAGONAL);
            }
            PieceType::King => self.add_step_moves(&mut moves, board, piece, square, &KING_STEPS),
        }
        moves
    }

    /// Pseudo moves of the piece on `square` that keep its own king safe.
    pub fn generate_legal_moves(&self, board: &Board, square: Square) -> Vec<Move> {
        let color = match board.get(square) {
            Some(piece) => piece.color,
            None => return Vec::new(),
        };
        self.generate_pseudo_moves(board, square)
            .into_iter()
            .filter(|mv| !self.leaves_king_in_check(board, mv, color))
            .collect()
    }

    /// Legal moves of every piece of `color`, in board order.
    pub fn generate_all_legal_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        board
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .flat_map(|(square, _)| self.generate_legal_moves(board, square))
            .collect()
    }

    pub fn is_move_legal(&self, board: &Board, mv: &Move) -> bool {
        self.generate_legal_moves(board, mv.from).contains(mv)
    }

    // Pawns push one square forward when it is empty, two from their start
    // row when both squares are empty, and capture one square diagonally.
    fn add_pawn_moves(&self, moves: &mut Vec<Move>, board: &Board, piece: Piece, from: Square) {
        let direction = piece.color.forward();

        if let Some(one) = from.offset(direction, 0) {
            if board.get(one).is_none() {
                moves.push(Move::between(from, one));
                if from.row == piece.color.pawn_start_row() {
                    if let Some(two) = from.offset(2 * direction, 0) {
                        if board.get(two).is_none() {
                            moves.push(Move::between(from, two));
                        }
                    }
                }
            }
        }

        for dc in [-1, 1] {
            if let Some(target) = from.offset(direction, dc) {
                if let Some(other) = board.get(target) {
                    if other.color != piece.color {
                        moves.push(Move::between(from, target));
                    }
                }
            }
        }
    }

    fn add_step_moves(
        &self,
        moves: &mut Vec<Move>,
        board: &Board,
        piece: Piece,
        from: Square,
        steps: &[(i8, i8)],
    ) {
        for &(dr, dc) in steps {
            if let Some(target) = from.offset(dr, dc) {
                match board.get(target) {
                    Some(other) if other.color == piece.color => {}
                    _ => moves.push(Move::between(from, target)),
                }
            }
        }
    }

    fn add_sliding_moves(
        &self,
        moves: &mut Vec<Move>,
        board: &Board,
        piece: Piece,
        from: Square,
        directions: &[(i8, i8)],
    ) {
        for &(dr, dc) in directions {
            let mut current = from;
            while let Some(target) = current.offset(dr, dc) {
                match board.get(target) {
                    None => moves.push(Move::between(from, target)),
                    Some(other) => {
                        if other.color != piece.color {
                            moves.push(Move::between(from, target));
                        }
                        break;
                    }
                }
                current = target;
            }
        }
    }

    /// Plays `mv` on a copy of the board and asks whether `color` is then in
    /// check. The board passed in is never touched.
    fn leaves_king_in_check(&self, board: &Board, mv: &Move, color: Color) -> bool {
        let mut board_copy = board.clone();
        board_copy.relocate(mv.from, mv.to);
        self.is_king_in_check(&board_copy, color)
    }

    pub fn is_square_under_attack(&self, board: &Board, square: Square, attacker_color: Color) -> bool {
        board
            .pieces()
            .filter(|(_, piece)| piece.color == attacker_color)
            .any(|(from, _)| {
                self.generate_pseudo_moves(board, from)
                    .iter()
                    .any(|mv| mv.to == square)
            })
    }

    /// A board without a king of `color` is never in check.
    pub fn is_king_in_check(&self, board: &Board, color: Color) -> bool {
        match board.find_king(color) {
            Some(king_square) => self.is_square_under_attack(board, king_square, color.opposite()),
            None => false,
        }
    }

    pub fn has_any_legal_move(&self, board: &Board, color: Color) -> bool {
        board
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .any(|(square, _)| !self.generate_legal_moves(board, square).is_empty())
    }

    pub fn is_checkmate(&self, board: &Board, color: Color) -> bool {
        self.is_king_in_check(board, color) && !self.has_any_legal_move(board, color)
    }

    pub fn is_stalemate(&self, board: &Board, color: Color) -> bool {
        !self.is_king_in_check(board, color) && !self.has_any_legal_move(board, color)
    }

    /// Status of the side `to_move`.
    pub fn get_game_state(&self, board: &Board, to_move: Color) -> GameState {
        let in_check = self.is_king_in_check(board, to_move);
        let can_move = self.has_any_legal_move(board, to_move);
        match (in_check, can_move) {
            (true, false) => GameState::Checkmate(to_move.opposite()),
            (false, false) => GameState::Stalemate,
            (true, true) => GameState::Check,
            (false, true) => GameState::Ongoing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(board: &mut Board, row: u8, col: u8, kind: PieceType, color: Color) {
        board.set(Square::new(row, col), Some(Piece::new(kind, color)));
    }

    fn play(board: &mut Board, mv: Move) {
        board.relocate(mv.from, mv.to);
    }

    #[test]
    fn test_initial_position_move_count() {
        let board = Board::new();
        let generator = MoveGenerator::new();
        assert_eq!(generator.generate_all_legal_moves(&board, Color::White).len(), 20);
        assert_eq!(generator.generate_all_legal_moves(&board, Color::Black).len(), 20);
    }

    #[test]
    fn test_opening_pawn_push() {
        let board = Board::new();
        let generator = MoveGenerator::new();
        let moves = generator.generate_legal_moves(&board, Square::new(6, 4));
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&Move::new(6, 4, 5, 4)));
        assert!(moves.contains(&Move::new(6, 4, 4, 4)));
    }

    #[test]
    fn test_pawn_double_push_blocked() {
        let mut board = Board::new();
        let generator = MoveGenerator::new();
        place(&mut board, 4, 4, PieceType::Knight, Color::Black);
        let moves = generator.generate_legal_moves(&board, Square::new(6, 4));
        assert_eq!(moves, vec![Move::new(6, 4, 5, 4)]);

        place(&mut board, 5, 4, PieceType::Knight, Color::Black);
        assert!(generator.generate_legal_moves(&board, Square::new(6, 4)).is_empty());
    }

    #[test]
    fn test_pawn_captures_only_enemies() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 4, 4, PieceType::Pawn, Color::White);
        place(&mut board, 3, 3, PieceType::Pawn, Color::Black);
        place(&mut board, 3, 5, PieceType::Pawn, Color::White);

        let moves = generator.generate_pseudo_moves(&board, Square::new(4, 4));
        assert!(moves.contains(&Move::new(4, 4, 3, 3)));
        assert!(!moves.contains(&Move::new(4, 4, 3, 5)));
        assert!(moves.contains(&Move::new(4, 4, 3, 4)));
        // not on its start row
        assert!(!moves.contains(&Move::new(4, 4, 2, 4)));
    }

    #[test]
    fn test_black_pawn_moves_down() {
        let board = Board::new();
        let generator = MoveGenerator::new();
        let moves = generator.generate_legal_moves(&board, Square::new(1, 0));
        assert_eq!(moves, vec![Move::new(1, 0, 2, 0), Move::new(1, 0, 3, 0)]);
    }

    #[test]
    fn test_knight_in_corner() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 7, 7, PieceType::Knight, Color::White);
        place(&mut board, 5, 6, PieceType::Pawn, Color::White);
        let moves = generator.generate_pseudo_moves(&board, Square::new(7, 7));
        assert_eq!(moves, vec![Move::new(7, 7, 6, 5)]);
    }

    #[test]
    fn test_rook_rays_stop_at_pieces() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 4, 4, PieceType::Rook, Color::White);
        place(&mut board, 4, 6, PieceType::Pawn, Color::Black);
        place(&mut board, 2, 4, PieceType::Pawn, Color::White);

        let moves = generator.generate_pseudo_moves(&board, Square::new(4, 4));
        assert!(moves.contains(&Move::new(4, 4, 4, 5)));
        assert!(moves.contains(&Move::new(4, 4, 4, 6)));
        assert!(!moves.contains(&Move::new(4, 4, 4, 7)));
        assert!(moves.contains(&Move::new(4, 4, 3, 4)));
        assert!(!moves.contains(&Move::new(4, 4, 2, 4)));
        // 4 left, 2 right, 3 down, 1 up
        assert_eq!(moves.len(), 10);
    }

    #[test]
    fn test_queen_on_empty_board() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 3, 3, PieceType::Queen, Color::Black);
        assert_eq!(generator.generate_pseudo_moves(&board, Square::new(3, 3)).len(), 27);
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 7, 4, PieceType::King, Color::White);
        place(&mut board, 0, 3, PieceType::Rook, Color::Black);
        place(&mut board, 0, 7, PieceType::King, Color::Black);

        let moves = generator.generate_legal_moves(&board, Square::new(7, 4));
        assert!(!moves.iter().any(|mv| mv.to.col == 3));
        assert_eq!(moves.len(), 3);
    }

    #[test]
    fn test_pinned_bishop() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 7, 4, PieceType::King, Color::White);
        place(&mut board, 5, 4, PieceType::Bishop, Color::White);
        place(&mut board, 0, 4, PieceType::Rook, Color::Black);
        place(&mut board, 0, 0, PieceType::King, Color::Black);

        assert!(!generator.generate_pseudo_moves(&board, Square::new(5, 4)).is_empty());
        assert!(generator.generate_legal_moves(&board, Square::new(5, 4)).is_empty());
    }

    #[test]
    fn test_pinned_rook_slides_along_pin() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 7, 4, PieceType::King, Color::White);
        place(&mut board, 5, 4, PieceType::Rook, Color::White);
        place(&mut board, 0, 4, PieceType::Rook, Color::Black);
        place(&mut board, 0, 0, PieceType::King, Color::Black);

        let moves = generator.generate_legal_moves(&board, Square::new(5, 4));
        assert!(moves.iter().all(|mv| mv.to.col == 4));
        assert!(moves.contains(&Move::new(5, 4, 0, 4)));
        assert!(moves.contains(&Move::new(5, 4, 6, 4)));
        assert_eq!(moves.len(), 6);
    }

    #[test]
    fn test_missing_king_is_not_in_check() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 0, 0, PieceType::Queen, Color::Black);
        assert!(!generator.is_king_in_check(&board, Color::White));
    }

    #[test]
    fn test_legal_moves_are_safe() {
        let mut board = Board::new();
        let generator = MoveGenerator::new();
        play(&mut board, Move::new(6, 4, 4, 4));
        play(&mut board, Move::new(1, 3, 3, 3));
        play(&mut board, Move::new(7, 5, 3, 1));

        for mv in generator.generate_all_legal_moves(&board, Color::Black) {
            let mut after = board.clone();
            play(&mut after, mv);
            assert!(!generator.is_king_in_check(&after, Color::Black));
        }
    }

    #[test]
    fn test_probe_leaves_board_unchanged() {
        let mut board = Board::new();
        let generator = MoveGenerator::new();
        play(&mut board, Move::new(6, 4, 4, 4));
        let before = board.clone();

        let first = generator.generate_legal_moves(&board, Square::new(7, 3));
        let second = generator.generate_legal_moves(&board, Square::new(7, 3));
        assert_eq!(first, second);
        assert_eq!(board, before);
    }

    #[test]
    fn test_fools_mate() {
        let mut board = Board::new();
        let generator = MoveGenerator::new();
        play(&mut board, Move::new(6, 5, 5, 5));
        play(&mut board, Move::new(1, 4, 3, 4));
        play(&mut board, Move::new(6, 6, 4, 6));
        play(&mut board, Move::new(0, 3, 4, 7));

        assert!(generator.is_king_in_check(&board, Color::White));
        assert!(generator.is_checkmate(&board, Color::White));
        assert!(!generator.is_stalemate(&board, Color::White));
        assert_eq!(
            generator.get_game_state(&board, Color::White),
            GameState::Checkmate(Color::Black)
        );
    }

    #[test]
    fn test_stalemate_is_not_checkmate() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        // black king a8, white queen c7, white king c6
        place(&mut board, 0, 0, PieceType::King, Color::Black);
        place(&mut board, 1, 2, PieceType::Queen, Color::White);
        place(&mut board, 2, 2, PieceType::King, Color::White);

        assert!(!generator.is_king_in_check(&board, Color::Black));
        assert!(!generator.has_any_legal_move(&board, Color::Black));
        assert!(generator.is_stalemate(&board, Color::Black));
        assert!(!generator.is_checkmate(&board, Color::Black));
        assert_eq!(generator.get_game_state(&board, Color::Black), GameState::Stalemate);
    }

    #[test]
    fn test_back_rank_checkmate() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 0, 6, PieceType::King, Color::Black);
        place(&mut board, 1, 5, PieceType::Pawn, Color::Black);
        place(&mut board, 1, 6, PieceType::Pawn, Color::Black);
        place(&mut board, 1, 7, PieceType::Pawn, Color::Black);
        place(&mut board, 0, 0, PieceType::Rook, Color::White);
        place(&mut board, 7, 6, PieceType::King, Color::White);

        assert!(generator.is_checkmate(&board, Color::Black));
        assert!(!generator.is_stalemate(&board, Color::Black));
    }

    #[test]
    fn test_check_with_escape() {
        let mut board = Board::empty();
        let generator = MoveGenerator::new();
        place(&mut board, 0, 4, PieceType::King, Color::Black);
        place(&mut board, 4, 4, PieceType::Rook, Color::White);
        place(&mut board, 7, 0, PieceType::King, Color::White);

        assert_eq!(generator.get_game_state(&board, Color::Black), GameState::Check);
        assert!(generator.is_move_legal(&board, &Move::new(0, 4, 0, 3)));
        assert!(!generator.is_move_legal(&board, &Move::new(0, 4, 1, 4)));
    }
}
