//! Position capability consumed by engines and the dispatcher.

use std::fmt;

use cozy_chess::{Board, Move, Piece};

/// The view of a game position the arena needs.
///
/// Legal-move generation is the job of the rules engine behind the
/// implementation; the arena only enumerates, classifies and compares moves.
pub trait GamePosition {
    /// A move in this game. Must be comparable for legal-set membership.
    type Move: Copy + Eq + fmt::Debug + fmt::Display + Send + 'static;

    /// All legal moves for the side to move, in the rules engine's order.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Whether `mv` (a legal move) removes an opposing piece.
    fn is_capture(&self, mv: Self::Move) -> bool;

    /// Whether `mv` is legal here.
    fn is_legal(&self, mv: Self::Move) -> bool {
        self.legal_moves().contains(&mv)
    }

    /// All legal moves that capture.
    fn captures(&self) -> Vec<Self::Move> {
        self.legal_moves()
            .into_iter()
            .filter(|&mv| self.is_capture(mv))
            .collect()
    }
}

impl GamePosition for Board {
    type Move = Move;

    fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.generate_moves(|piece_moves| {
            moves.extend(piece_moves);
            false
        });
        moves
    }

    fn is_capture(&self, mv: Move) -> bool {
        // Castling is encoded as king-takes-own-rook, so only enemy pieces count.
        if self.color_on(mv.to) == Some(!self.side_to_move()) {
            return true;
        }
        // En passant: a pawn moving diagonally onto an empty square.
        self.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
            && self.piece_on(mv.to).is_none()
    }

    fn is_legal(&self, mv: Move) -> bool {
        Board::is_legal(self, mv)
    }
}
