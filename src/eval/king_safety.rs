//! King safety: pawn-shield presence in front of a castled king.

use cozy_chess::{Board, Color, Piece, Square};

const MISSING_SHIELD_PENALTY: i32 = 18;

/// King-safety score for one color, positive is good for that color.
///
/// Only applies while the king sits on its back two ranks; a king in
/// the middle of the board is the piece-square tables' problem.
pub fn king_safety(board: &Board, color: Color) -> i32 {
    let king = board.king(color);
    let rel_rank = match color {
        Color::White => king.rank() as usize,
        Color::Black => 7 - king.rank() as usize,
    };
    if rel_rank > 1 {
        return 0;
    }

    let our_pawns = board.pieces(Piece::Pawn) & board.colors(color);
    let forward: i8 = match color {
        Color::White => 1,
        Color::Black => -1,
    };

    let mut missing = 0;
    for df in -1i8..=1 {
        // Shield squares: one and two ranks ahead on this file.
        let mut covered = false;
        for dr in 1i8..=2 {
            if let Some(sq) = offset(king, df, forward * dr) {
                if our_pawns.has(sq) {
                    covered = true;
                    break;
                }
            }
        }
        // File off the board does not count against the shield.
        if !covered && offset(king, df, forward).is_some() {
            missing += 1;
        }
    }
    -missing * MISSING_SHIELD_PENALTY
}

fn offset(sq: Square, df: i8, dr: i8) -> Option<Square> {
    sq.try_offset(df, dr)
}
