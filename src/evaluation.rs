use crate::board::{Board, Color, PieceType, Square};

/// Material count with a small bonus for advanced pawns.
pub struct Evaluator {
    pub pawn_value: i32,
    pub knight_value: i32,
    pub bishop_value: i32,
    pub rook_value: i32,
    pub queen_value: i32,
    pub king_value: i32,

    // Per row of advancement, counted from the pawn's start row.
    pub pawn_advance_bonus: i32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            pawn_value: 100,
            knight_value: 320,
            bishop_value: 330,
            rook_value: 500,
            queen_value: 900,
            king_value: 20000,
            pawn_advance_bonus: 5,
        }
    }

    pub fn piece_value(&self, kind: PieceType) -> i32 {
        match kind {
            PieceType::Pawn => self.pawn_value,
            PieceType::Knight => self.knight_value,
            PieceType::Bishop => self.bishop_value,
            PieceType::Rook => self.rook_value,
            PieceType::Queen => self.queen_value,
            PieceType::King => self.king_value,
        }
    }

    /// Score of `board` from `perspective`'s point of view.
    pub fn evaluate(&self, board: &Board, perspective: Color) -> i32 {
        let mut score = 0;
        for (square, piece) in board.pieces() {
            let value = self.piece_value(piece.kind) + self.positional_bonus(square, piece.kind, piece.color);
            if piece.color == perspective {
                score += value;
            } else {
                score -= value;
            }
        }
        score
    }

    fn positional_bonus(&self, square: Square, kind: PieceType, color: Color) -> i32 {
        if kind != PieceType::Pawn {
            return 0;
        }
        let advanced = (square.row as i32 - color.pawn_start_row() as i32).abs();
        advanced * self.pawn_advance_bonus
    }
}
