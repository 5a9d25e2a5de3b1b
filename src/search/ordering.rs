//! Move ordering: TT move, MVV-LVA captures, killers, history quiets.
//!
//! Ordering only changes examination order; the legal move set is the
//! rules engine's business.

use cozy_chess::{Board, Move, Piece};

use crate::eval::piece_value;

/// Recursion ceiling, shared with the searcher. Killer slots are sized
/// to it.
pub const MAX_PLY: usize = 128;

const TT_MOVE_SCORE: i32 = 1_000_000;
const CAPTURE_BASE: i32 = 100_000;
const PROMOTION_BONUS: i32 = 80_000;
const KILLER_PRIMARY: i32 = 60_000;
const KILLER_SECONDARY: i32 = 59_000;

/// Two quiet cutoff moves per ply, most recent first.
pub struct KillerTable {
    slots: [[Option<Move>; 2]; MAX_PLY],
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: [[None; 2]; MAX_PLY],
        }
    }

    pub fn store(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let slot = &mut self.slots[ply];
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }
    }

    fn bonus(&self, ply: usize, mv: Move) -> i32 {
        if ply >= MAX_PLY {
            return 0;
        }
        let slot = &self.slots[ply];
        if slot[0] == Some(mv) {
            KILLER_PRIMARY
        } else if slot[1] == Some(mv) {
            KILLER_SECONDARY
        } else {
            0
        }
    }

    pub fn is_killer(&self, ply: usize, mv: Move) -> bool {
        self.bonus(ply, mv) != 0
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp for accumulated history scores.
const HISTORY_MAX: i32 = 16_384;

/// Quiet-move success scores indexed by `[moved piece][to square]`.
/// Reset between independent top-level searches.
pub struct HistoryTable {
    table: [[i32; 64]; 6],
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: [[0; 64]; 6],
        }
    }

    pub fn reward(&mut self, piece: Piece, to: usize, depth: u32) {
        let bonus = (depth as i32) * (depth as i32);
        let entry = &mut self.table[piece as usize][to];
        *entry = (*entry + bonus).min(HISTORY_MAX);
    }

    pub fn punish(&mut self, piece: Piece, to: usize, depth: u32) {
        let penalty = (depth as i32) * (depth as i32);
        let entry = &mut self.table[piece as usize][to];
        *entry = (*entry - penalty).max(-HISTORY_MAX);
    }

    pub fn score(&self, piece: Piece, to: usize) -> i32 {
        self.table[piece as usize][to]
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Capture test that covers en passant: a pawn changing file without a
/// victim on the destination square is capturing en passant.
pub fn is_capture(board: &Board, mv: Move) -> bool {
    if board.colors(!board.side_to_move()).has(mv.to) {
        return true;
    }
    board.piece_on(mv.from) == Some(Piece::Pawn) && mv.from.file() != mv.to.file()
}

fn score_move(
    board: &Board,
    mv: Move,
    tt_move: Option<Move>,
    killers: &KillerTable,
    history: &HistoryTable,
    ply: usize,
) -> i32 {
    if Some(mv) == tt_move {
        return TT_MOVE_SCORE;
    }
    let mut score = 0;
    if is_capture(board, mv) {
        let victim = board.piece_on(mv.to).unwrap_or(Piece::Pawn);
        let attacker = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
        score += CAPTURE_BASE + piece_value(victim) * 10 - piece_value(attacker);
    }
    if mv.promotion == Some(Piece::Queen) {
        score += PROMOTION_BONUS;
    }
    if score != 0 {
        return score;
    }
    let killer = killers.bonus(ply, mv);
    if killer != 0 {
        return killer;
    }
    let piece = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
    history.score(piece, mv.to as usize)
}

/// Rank moves in place, best first. Stable, so ties keep the rules
/// engine's generation order.
pub fn order_moves(
    board: &Board,
    moves: &mut [Move],
    tt_move: Option<Move>,
    killers: &KillerTable,
    history: &HistoryTable,
    ply: usize,
) {
    moves.sort_by_key(|&m| -score_move(board, m, tt_move, killers, history, ply));
}

/// Capture-only MVV-LVA ranking for quiescence.
pub fn order_captures(board: &Board, moves: &mut [Move]) {
    moves.sort_by_key(|&m| {
        let victim = board.piece_on(m.to).unwrap_or(Piece::Pawn);
        let attacker = board.piece_on(m.from).unwrap_or(Piece::Pawn);
        -(piece_value(victim) * 10 - piece_value(attacker))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::Square;

    fn mv(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    #[test]
    fn killer_store_and_shift() {
        let mut kt = KillerTable::new();
        let a = mv(Square::E2, Square::E4);
        let b = mv(Square::D2, Square::D4);
        kt.store(5, a);
        assert!(kt.is_killer(5, a));
        assert!(!kt.is_killer(5, b));
        kt.store(5, b);
        assert!(kt.is_killer(5, a));
        assert!(kt.is_killer(5, b));
        assert!(!kt.is_killer(6, a));
    }

    #[test]
    fn history_clamped() {
        let mut ht = HistoryTable::new();
        for _ in 0..500 {
            ht.reward(Piece::Knight, 20, 10);
        }
        assert_eq!(ht.score(Piece::Knight, 20), HISTORY_MAX);
        for _ in 0..1000 {
            ht.punish(Piece::Knight, 20, 10);
        }
        assert_eq!(ht.score(Piece::Knight, 20), -HISTORY_MAX);
    }

    #[test]
    fn pawn_takes_queen_before_queen_takes_pawn() {
        // White pawn on c3 and queen on h4 can both capture on d4/h7.
        let b = Board::from_fen("4k3/7p/8/8/3q3Q/2P5/8/4K3 w - - 0 1", false).unwrap();
        let pxq = mv(Square::C3, Square::D4);
        let qxp = mv(Square::H4, Square::H7);
        let kt = KillerTable::new();
        let ht = HistoryTable::new();
        let s_pxq = score_move(&b, pxq, None, &kt, &ht, 0);
        let s_qxp = score_move(&b, qxp, None, &kt, &ht, 0);
        assert!(s_pxq > s_qxp, "PxQ {} should outrank QxP {}", s_pxq, s_qxp);
    }

    #[test]
    fn tt_move_outranks_everything() {
        let b = Board::default();
        let quiet = mv(Square::G1, Square::F3);
        let mut moves = Vec::new();
        b.generate_moves(|ml| {
            for m in ml {
                moves.push(m);
            }
            false
        });
        let kt = KillerTable::new();
        let ht = HistoryTable::new();
        order_moves(&b, &mut moves, Some(quiet), &kt, &ht, 0);
        assert_eq!(moves[0], quiet);
    }

    #[test]
    fn en_passant_is_a_capture() {
        let b = Board::from_fen(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
            false,
        )
        .unwrap();
        let ep = mv(Square::E5, Square::D6);
        assert!(is_capture(&b, ep));
        assert!(!is_capture(&b, mv(Square::E5, Square::E6)));
    }
}
