//! Pawn structure: doubled and isolated penalties, passed-pawn bonus,
//! and the square rule for unstoppable passers.

use cozy_chess::{BitBoard, Board, Color, File, Piece, Rank, Square};

const DOUBLED_PENALTY: i32 = 15;
const ISOLATED_PENALTY: i32 = 12;

/// Bonus for a passed pawn by relative rank (rank 2 .. rank 7).
const PASSED_BONUS: [i32; 8] = [0, 10, 20, 35, 60, 100, 150, 0];

/// A passer the defending king provably cannot catch dominates every
/// ordinary positional term.
const UNSTOPPABLE_BONUS: i32 = 700;

const FILE_A: u64 = 0x0101010101010101;

fn file_bb(f: File) -> u64 {
    FILE_A << (f as usize)
}

fn adjacent_files_bb(f: File) -> u64 {
    let bb = file_bb(f);
    ((bb >> 1) & !file_bb(File::H)) | ((bb << 1) & !file_bb(File::A))
}

/// All squares strictly in front of `r` from `color`'s point of view.
fn forward_bb(color: Color, r: Rank) -> u64 {
    match color {
        Color::White => !0u64 << ((r as usize + 1) * 8),
        Color::Black => !0u64 >> ((8 - r as usize) * 8),
    }
}

fn relative_rank(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq.rank() as usize,
        Color::Black => 7 - sq.rank() as usize,
    }
}

fn chebyshev(a: Square, b: Square) -> i32 {
    let df = (a.file() as i32 - b.file() as i32).abs();
    let dr = (a.rank() as i32 - b.rank() as i32).abs();
    df.max(dr)
}

/// Square rule: can the defending king still catch this passer?
///
/// Only meaningful when the defender has nothing but king and pawns;
/// any other piece could blockade or capture from afar.
fn is_unstoppable(board: &Board, color: Color, pawn_sq: Square) -> bool {
    let them = !color;
    let their_pieces = board.colors(them)
        & !(board.pieces(Piece::Pawn) | board.pieces(Piece::King));
    if !their_pieces.is_empty() {
        return false;
    }

    let promo_rank = match color {
        Color::White => Rank::Eighth,
        Color::Black => Rank::First,
    };
    let promo_sq = Square::new(pawn_sq.file(), promo_rank);
    let rel = relative_rank(color, pawn_sq);
    let mut steps = 7 - rel as i32;
    if rel == 1 {
        // Double push available from the starting rank.
        steps -= 1;
    }

    let mut king_dist = chebyshev(board.king(them), promo_sq);
    if board.side_to_move() == them {
        // Defender moves first.
        king_dist -= 1;
    }
    king_dist > steps
}

/// Pawn-structure score for one color, positive is good for that color.
pub fn pawn_structure(board: &Board, color: Color) -> i32 {
    let us = board.colors(color);
    let them = board.colors(!color);
    let pawns = board.pieces(Piece::Pawn) & us;
    let enemy_pawns = board.pieces(Piece::Pawn) & them;

    let mut score = 0;

    for f in File::ALL {
        let on_file = (pawns & BitBoard(file_bb(f))).len() as i32;
        if on_file > 1 {
            score -= (on_file - 1) * DOUBLED_PENALTY;
        }
    }

    for sq in pawns {
        let f = sq.file();
        if (pawns & BitBoard(adjacent_files_bb(f))).is_empty() {
            score -= ISOLATED_PENALTY;
        }

        let front_span =
            BitBoard((file_bb(f) | adjacent_files_bb(f)) & forward_bb(color, sq.rank()));
        if (front_span & enemy_pawns).is_empty() {
            score += PASSED_BONUS[relative_rank(color, sq)];
            if is_unstoppable(board, color, sq) {
                score += UNSTOPPABLE_BONUS;
            }
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubled_pawns_penalized() {
        // White: doubled pawns on e-file; Black: clean e+d pawns.
        let b = Board::from_fen("4k3/3pp3/8/8/4P3/4P3/8/4K3 w - - 0 1", false).unwrap();
        assert!(pawn_structure(&b, Color::White) < pawn_structure(&b, Color::Black));
    }

    #[test]
    fn isolated_pawn_penalized() {
        // Both sides one pawn: White's a-pawn is isolated by definition
        // (no friendly pawn at all on adjacent files), same for Black's,
        // so compare against a supported duo instead.
        let lone = Board::from_fen("4k3/8/8/8/8/8/P7/4K3 w - - 0 1", false).unwrap();
        let duo = Board::from_fen("4k3/8/8/8/8/8/PP6/4K3 w - - 0 1", false).unwrap();
        assert!(
            pawn_structure(&duo, Color::White) > pawn_structure(&lone, Color::White) * 2
        );
    }

    #[test]
    fn advanced_passer_outscores_home_passer() {
        let home = Board::from_fen("4k3/8/8/8/8/8/P7/4K3 w - - 0 1", false).unwrap();
        let far = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", false).unwrap();
        assert!(
            pawn_structure(&far, Color::White) > pawn_structure(&home, Color::White)
        );
    }

    #[test]
    fn square_rule_flags_uncatchable_pawn() {
        // White pawn on a6, Black king on h8, White to move: the king
        // is outside the square.
        let b = Board::from_fen("7k/8/P7/8/8/8/8/4K3 w - - 0 1", false).unwrap();
        assert!(pawn_structure(&b, Color::White) >= UNSTOPPABLE_BONUS);
    }

    #[test]
    fn square_rule_respects_defender_tempo() {
        // Same position but Black to move: the king steps into the
        // square (g7 catches the a-pawn? it cannot — distance h8 to a8
        // is 7, pawn needs 2 moves; still unstoppable). Use a closer
        // king instead: d8 catches a6 with the move.
        let b = Board::from_fen("3k4/8/P7/8/8/8/8/4K3 b - - 0 1", false).unwrap();
        assert!(pawn_structure(&b, Color::White) < UNSTOPPABLE_BONUS);
    }
}
