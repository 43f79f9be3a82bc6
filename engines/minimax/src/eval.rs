//! Material plus piece-square evaluation.

use cozy_chess::{Board, Color, Piece};

/// Material values in centipawns, indexed by `Piece as usize`.
/// Order: Pawn, Knight, Bishop, Rook, Queen, King
pub(crate) const PIECE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 0];

const BISHOP_PAIR: i32 = 30;

// Tables are laid out from White's point of view, rank 8 first.
#[rustfmt::skip]
const PAWN_PST: [[i32; 8]; 8] = [
    [ 0,  0,   0,   0,   0,   0,  0,  0],
    [50, 50,  50,  50,  50,  50, 50, 50],
    [10, 10,  20,  30,  30,  20, 10, 10],
    [ 5,  5,  10,  25,  25,  10,  5,  5],
    [ 0,  0,   0,  20,  20,   0,  0,  0],
    [ 5, -5, -10,   0,   0, -10, -5,  5],
    [ 5, 10,  10, -20, -20,  10, 10,  5],
    [ 0,  0,   0,   0,   0,   0,  0,  0],
];

#[rustfmt::skip]
const KNIGHT_PST: [[i32; 8]; 8] = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20,   0,   0,   0,   0, -20, -40],
    [-30,   0,  10,  15,  15,  10,   0, -30],
    [-30,   5,  15,  20,  20,  15,   5, -30],
    [-30,   0,  15,  20,  20,  15,   0, -30],
    [-30,   5,  10,  15,  15,  10,   5, -30],
    [-40, -20,   0,   5,   5,   0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

#[rustfmt::skip]
const BISHOP_PST: [[i32; 8]; 8] = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10,   0,   0,   0,   0,   0,   0, -10],
    [-10,   0,   5,  10,  10,   5,   0, -10],
    [-10,   5,   5,  10,  10,   5,   5, -10],
    [-10,   0,  10,  10,  10,  10,   0, -10],
    [-10,  10,  10,  10,  10,  10,  10, -10],
    [-10,   5,   0,   0,   0,   0,   5, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];

#[rustfmt::skip]
const ROOK_PST: [[i32; 8]; 8] = [
    [ 0,  0,  0,  0,  0,  0,  0,  0],
    [ 5, 10, 10, 10, 10, 10, 10,  5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [ 0,  0,  0,  5,  5,  0,  0,  0],
];

#[rustfmt::skip]
const QUEEN_PST: [[i32; 8]; 8] = [
    [-20, -10, -10, -5, -5, -10, -10, -20],
    [-10,   0,   0,  0,  0,   0,   0, -10],
    [-10,   0,   5,  5,  5,   5,   0, -10],
    [ -5,   0,   5,  5,  5,   5,   0,  -5],
    [  0,   0,   5,  5,  5,   5,   0,  -5],
    [-10,   5,   5,  5,  5,   5,   0, -10],
    [-10,   0,   5,  0,  0,   0,   0, -10],
    [-20, -10, -10, -5, -5, -10, -10, -20],
];

#[rustfmt::skip]
const KING_PST: [[i32; 8]; 8] = [
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [ 20,  30,  10,   0,   0,  10,  30,  20],
    [ 20,  30,  30,  10,  10,  30,  30,  20],
];

fn table(piece: Piece) -> &'static [[i32; 8]; 8] {
    match piece {
        Piece::Pawn => &PAWN_PST,
        Piece::Knight => &KNIGHT_PST,
        Piece::Bishop => &BISHOP_PST,
        Piece::Rook => &ROOK_PST,
        Piece::Queen => &QUEEN_PST,
        Piece::King => &KING_PST,
    }
}

/// Evaluates the position from the side-to-move's perspective.
///
/// Returns a score in centipawns:
/// - Positive = good for side to move
/// - Negative = bad for side to move
pub fn evaluate(board: &Board) -> i32 {
    let mut score = 0i32;

    for color in Color::ALL {
        let sign = if color == Color::White { 1 } else { -1 };
        for piece in Piece::ALL {
            let pst = table(piece);
            for square in board.colored_pieces(color, piece) {
                let file = square.file() as usize;
                let rank = square.rank() as usize;
                let row = if color == Color::White { 7 - rank } else { rank };
                score += sign * (PIECE_VALUES[piece as usize] + pst[row][file]);
            }
        }
        if board.colored_pieces(color, Piece::Bishop).len() >= 2 {
            score += sign * BISHOP_PAIR;
        }
    }

    if board.side_to_move() == Color::White {
        score
    } else {
        -score
    }
}
