//! Piece-square tables and game phase.
//!
//! Tables are from White's point of view with a1 = index 0; Black
//! mirrors by flipping the rank. Middlegame and endgame tables are
//! blended by phase.

use cozy_chess::{Board, Color, Piece, Square};

#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
      0,  0,  0,  0,  0,  0,  0,  0,
      5, 10, 10,-20,-20, 10, 10,  5,
      5, -5,-10,  0,  0,-10, -5,  5,
      0,  0,  0, 20, 20,  0,  0,  0,
      5,  5, 10, 25, 25, 10,  5,  5,
     10, 10, 20, 30, 30, 20, 10, 10,
     50, 50, 50, 50, 50, 50, 50, 50,
      0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
      0,  0,  0,  0,  0,  0,  0,  0,
      5,  5,  5,  5,  5,  5,  5,  5,
      5,  5,  5,  5,  5,  5,  5,  5,
     10, 10, 10, 10, 10, 10, 10, 10,
     20, 20, 20, 20, 20, 20, 20, 20,
     40, 40, 40, 40, 40, 40, 40, 40,
     70, 70, 70, 70, 70, 70, 70, 70,
      0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
      0,  0,  0,  5,  5,  0,  0,  0,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     10, 20, 20, 20, 20, 20, 20, 10,
      0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -10,  5,  5,  5,  5,  5,  0,-10,
      0,  0,  5,  5,  5,  5,  0, -5,
     -5,  0,  5,  5,  5,  5,  0, -5,
    -10,  0,  5,  5,  5,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
     20, 30, 10,  0,  0, 10, 30, 20,
     20, 20,  0,  0,  0,  0, 20, 20,
    -10,-20,-20,-20,-20,-20,-20,-10,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    -50,-30,-30,-30,-30,-30,-30,-50,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -50,-40,-30,-20,-20,-30,-40,-50,
];

const PST_MG: [&[i32; 64]; 6] = [
    &PAWN_MG,
    &KNIGHT_PST,
    &BISHOP_PST,
    &ROOK_PST,
    &QUEEN_PST,
    &KING_MG,
];

const PST_EG: [&[i32; 64]; 6] = [
    &PAWN_EG,
    &KNIGHT_PST,
    &BISHOP_PST,
    &ROOK_PST,
    &QUEEN_PST,
    &KING_EG,
];

pub const PHASE_MAX: i32 = 24;

/// Game phase 0 (bare endgame) ..= 24 (full material), from minor,
/// rook, and queen counts across both sides.
pub fn game_phase(board: &Board) -> i32 {
    let minors =
        (board.pieces(Piece::Knight) | board.pieces(Piece::Bishop)).len() as i32;
    let rooks = board.pieces(Piece::Rook).len() as i32;
    let queens = board.pieces(Piece::Queen).len() as i32;
    (minors + rooks * 2 + queens * 4).min(PHASE_MAX)
}

/// Tapered table value for one piece on one square, White-relative.
pub fn pst_value(piece: Piece, color: Color, sq: Square, phase: i32) -> i32 {
    let idx = match color {
        Color::White => sq as usize,
        Color::Black => sq.flip_rank() as usize,
    };
    let p = piece as usize;
    let mg = PST_MG[p][idx];
    let eg = PST_EG[p][idx];
    (mg * phase + eg * (PHASE_MAX - phase)) / PHASE_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_full_at_startpos() {
        assert_eq!(game_phase(&Board::default()), PHASE_MAX);
    }

    #[test]
    fn phase_zero_with_bare_kings() {
        let b = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1", false).unwrap();
        assert_eq!(game_phase(&b), 0);
    }

    #[test]
    fn central_knight_beats_rim_knight() {
        let center = pst_value(Piece::Knight, Color::White, Square::E4, PHASE_MAX);
        let rim = pst_value(Piece::Knight, Color::White, Square::A1, PHASE_MAX);
        assert!(center > rim);
    }

    #[test]
    fn pst_is_color_symmetric() {
        let w = pst_value(Piece::Pawn, Color::White, Square::E4, PHASE_MAX);
        let b = pst_value(Piece::Pawn, Color::Black, Square::E5, PHASE_MAX);
        assert_eq!(w, b);
    }
}
