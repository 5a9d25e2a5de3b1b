//! Negamax alpha-beta with quiescence, null-move pruning, and
//! iterative deepening behind aspiration windows.
//!
//! All scores are fail-soft: a node may return a value outside its
//! window, and the transposition table records which side of the
//! window the value fell on.

use cozy_chess::{Board, Move, Piece, Square};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::eval::evaluate;
use crate::search::ordering::{
    is_capture, order_captures, order_moves, HistoryTable, KillerTable, MAX_PLY,
};
use crate::search::time::{TimeBudget, NODE_CHECK_INTERVAL};
use crate::search::tt::{Bound, Entry, Tt};
use crate::search::zobrist::{self, HashDelta};

/// Mate for the side to move at the root. Mates found deeper score
/// `MATE_SCORE - ply`, so shorter mates always win comparisons.
pub const MATE_SCORE: i32 = 30_000;

/// Window sentinel strictly above any reachable score.
pub const INFINITY: i32 = 32_000;

/// Scores at or beyond this magnitude are mate scores and carry a
/// distance-to-mate in their low bits.
const MATE_BOUND: i32 = MATE_SCORE - 512;

const ASPIRATION_WINDOW: i32 = 50;
const NULL_MOVE_MIN_DEPTH: u32 = 3;

pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_BOUND
}

/// Full moves until mate for a mate score, signed for the losing side.
pub fn moves_to_mate(score: i32) -> Option<i32> {
    if !is_mate_score(score) {
        return None;
    }
    let plies = MATE_SCORE - score.abs();
    let moves = (plies + 1) / 2;
    Some(if score > 0 { moves } else { -moves })
}

/// Mate scores are stored relative to the node that discovered them and
/// rebased to the probing node's ply, so a transposition reached at a
/// different depth still reports the right distance.
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score + ply as i32
    } else if score <= -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score - ply as i32
    } else if score <= -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

/// One completed deepening iteration.
#[derive(Clone, Copy, Debug)]
pub struct IterationResult {
    pub depth: u32,
    pub score: i32,
    pub best_move: Move,
}

/// Final outcome of one worker's deepening loop. `best` is `None` only
/// when not even depth 1 completed inside the budget.
#[derive(Clone, Copy, Debug)]
pub struct SearchOutcome {
    pub best: Option<IterationResult>,
    pub truncated: bool,
    pub nodes: u64,
    pub tt_hits: u64,
}

/// Per-thread search state. The transposition table and the stop flag
/// are shared; killers, history, and counters are private.
pub struct Searcher {
    tt: Arc<Tt>,
    stop: Arc<AtomicBool>,
    budget: TimeBudget,
    killers: KillerTable,
    history: HistoryTable,
    nodes: u64,
    tt_hits: u64,
    aborted: bool,
    root_best: Option<Move>,
}

impl Searcher {
    pub fn new(tt: Arc<Tt>, stop: Arc<AtomicBool>, budget: TimeBudget) -> Self {
        Self {
            tt,
            stop,
            budget,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            nodes: 0,
            tt_hits: 0,
            aborted: false,
            root_best: None,
        }
    }

    /// Deepen from 1 to `max_depth`, keeping the result of the last
    /// iteration that ran to completion. An iteration cut short by the
    /// clock or the stop flag is discarded whole.
    pub fn run(&mut self, board: &Board, max_depth: u32) -> SearchOutcome {
        let key = zobrist::hash(board);
        let mut best: Option<IterationResult> = None;
        let mut last_iter = Duration::ZERO;

        for depth in 1..=max_depth.max(1) {
            if depth > 1 && !self.budget.should_start_iteration(last_iter) {
                break;
            }
            // One table generation per iteration; eviction prefers
            // older generations at equal depth.
            self.tt.bump_generation();
            let started = Instant::now();
            let score = match best {
                Some(prev) if !is_mate_score(prev.score) => {
                    self.aspiration(board, key, depth, prev.score)
                }
                _ => self.root(board, key, depth, -INFINITY, INFINITY),
            };
            if self.aborted {
                return SearchOutcome {
                    best,
                    truncated: true,
                    nodes: self.nodes,
                    tt_hits: self.tt_hits,
                };
            }
            if let Some(mv) = self.root_best {
                best = Some(IterationResult {
                    depth,
                    score,
                    best_move: mv,
                });
                log::debug!(
                    "depth {} score {} best {} nodes {} elapsed {:?}",
                    depth,
                    score,
                    mv,
                    self.nodes,
                    self.budget.elapsed()
                );
            }
            if is_mate_score(score) {
                break;
            }
            last_iter = started.elapsed();
        }

        SearchOutcome {
            best,
            truncated: false,
            nodes: self.nodes,
            tt_hits: self.tt_hits,
        }
    }

    /// Search around the previous iteration's score, widening to a full
    /// window on the side that failed.
    fn aspiration(&mut self, board: &Board, key: u64, depth: u32, guess: i32) -> i32 {
        let mut alpha = (guess - ASPIRATION_WINDOW).max(-INFINITY);
        let mut beta = (guess + ASPIRATION_WINDOW).min(INFINITY);
        loop {
            let score = self.root(board, key, depth, alpha, beta);
            if self.aborted {
                return 0;
            }
            if score <= alpha {
                alpha = -INFINITY;
            } else if score >= beta {
                beta = INFINITY;
            } else {
                return score;
            }
        }
    }

    fn root(&mut self, board: &Board, key: u64, depth: u32, alpha: i32, beta: i32) -> i32 {
        self.root_best = None;
        self.negamax(board, key, depth, 0, alpha, beta, true)
    }

    /// Stop between polls costs at most `NODE_CHECK_INTERVAL` nodes.
    fn poll(&mut self) {
        if self.nodes % NODE_CHECK_INTERVAL == 0
            && (self.budget.hard_expired() || self.stop.load(AtomicOrdering::Relaxed))
        {
            self.aborted = true;
        }
    }

    fn negamax(
        &mut self,
        board: &Board,
        key: u64,
        depth: u32,
        ply: usize,
        mut alpha: i32,
        beta: i32,
        allow_null: bool,
    ) -> i32 {
        self.nodes += 1;
        self.poll();
        if self.aborted {
            return 0;
        }
        if ply >= MAX_PLY {
            return evaluate(board);
        }

        let alpha_orig = alpha;
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(key) {
            self.tt_hits += 1;
            tt_move = entry.best;
            // Never cut at the root: the caller needs a move, not a score.
            if ply > 0 && entry.depth >= depth {
                let score = score_from_tt(entry.score, ply);
                match entry.bound {
                    Bound::Exact => return score,
                    Bound::Lower if score >= beta => return score,
                    Bound::Upper if score <= alpha => return score,
                    _ => {}
                }
            }
        }

        let in_check = !board.checkers().is_empty();
        if depth == 0 {
            return self.quiescence(board, ply, alpha, beta);
        }

        if allow_null && !in_check && depth >= NULL_MOVE_MIN_DEPTH && beta.abs() < MATE_BOUND
        {
            let stm = board.side_to_move();
            let heavy = board.colors(stm)
                & !(board.pieces(Piece::Pawn) | board.pieces(Piece::King));
            if !heavy.is_empty() {
                if let Some(skipped) = board.null_move() {
                    let r = 2 + depth / 4;
                    let reduced = depth.saturating_sub(1 + r);
                    let nkey = zobrist::apply(key, HashDelta::between(board, &skipped));
                    let score =
                        -self.negamax(&skipped, nkey, reduced, ply + 1, -beta, -beta + 1, false);
                    if self.aborted {
                        return 0;
                    }
                    if score >= beta {
                        return beta;
                    }
                }
            }
        }

        let mut moves = Vec::with_capacity(48);
        board.generate_moves(|ml| {
            for m in ml {
                moves.push(m);
            }
            false
        });
        if moves.is_empty() {
            return if in_check { -MATE_SCORE + ply as i32 } else { 0 };
        }
        if board.halfmove_clock() >= 100 {
            return 0;
        }
        order_moves(board, &mut moves, tt_move, &self.killers, &self.history, ply);

        let mut best_score = -INFINITY;
        let mut best_move = None;
        let mut tried_quiets: Vec<(Piece, Square)> = Vec::new();

        for m in moves {
            let quiet = !is_capture(board, m) && m.promotion.is_none();
            let mut child = board.clone();
            child.play(m);
            let child_key = zobrist::apply(key, HashDelta::between(board, &child));
            let score =
                -self.negamax(&child, child_key, depth - 1, ply + 1, -beta, -alpha, true);
            if self.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(m);
                if ply == 0 {
                    self.root_best = Some(m);
                }
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if quiet {
                    self.killers.store(ply, m);
                    if let Some(piece) = board.piece_on(m.from) {
                        self.history.reward(piece, m.to as usize, depth);
                    }
                    for &(piece, to) in &tried_quiets {
                        self.history.punish(piece, to as usize, depth);
                    }
                }
                break;
            }
            if quiet {
                if let Some(piece) = board.piece_on(m.from) {
                    tried_quiets.push((piece, m.to));
                }
            }
        }

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(Entry {
            key,
            depth,
            score: score_to_tt(best_score, ply),
            best: best_move,
            bound,
            gen: 0,
        });
        best_score
    }

    /// Resolve captures (and queen promotions) until the position is
    /// quiet. Stand-pat is a fail-soft floor: the side to move may
    /// always decline the tactics. In check there is no floor and every
    /// evasion is searched.
    fn quiescence(&mut self, board: &Board, ply: usize, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        self.poll();
        if self.aborted {
            return 0;
        }
        if ply >= MAX_PLY {
            return evaluate(board);
        }

        let in_check = !board.checkers().is_empty();
        let mut best;
        let mut moves = Vec::with_capacity(16);

        if in_check {
            best = -INFINITY;
            board.generate_moves(|ml| {
                for m in ml {
                    moves.push(m);
                }
                false
            });
            if moves.is_empty() {
                return -MATE_SCORE + ply as i32;
            }
        } else {
            let stand = evaluate(board);
            best = stand;
            if stand >= beta {
                return stand;
            }
            if stand > alpha {
                alpha = stand;
            }
            board.generate_moves(|ml| {
                for m in ml {
                    if is_capture(board, m) || m.promotion == Some(Piece::Queen) {
                        moves.push(m);
                    }
                }
                false
            });
            order_captures(board, &mut moves);
        }

        for m in moves {
            let mut child = board.clone();
            child.play(m);
            let score = -self.quiescence(&child, ply + 1, -beta, -alpha);
            if self.aborted {
                return 0;
            }
            if score > best {
                best = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_search(fen: &str, depth: u32) -> SearchOutcome {
        let board = Board::from_fen(fen, false).unwrap();
        let tt = Arc::new(Tt::default());
        let stop = Arc::new(AtomicBool::new(false));
        let mut s = Searcher::new(tt, stop, TimeBudget::unlimited());
        s.run(&board, depth)
    }

    #[test]
    fn finds_mate_in_one() {
        let out = quick_search("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", 3);
        let best = out.best.expect("depth completed");
        assert_eq!(format!("{}", best.best_move), "a1a8");
        assert_eq!(best.score, MATE_SCORE - 1);
        assert_eq!(moves_to_mate(best.score), Some(1));
    }

    #[test]
    fn captures_hanging_queen() {
        // Rook on d1 takes the undefended queen on d8.
        let out = quick_search("3q2k1/8/8/8/8/8/8/3R2K1 w - - 0 1", 4);
        let best = out.best.expect("depth completed");
        assert_eq!(format!("{}", best.best_move), "d1d8");
    }

    #[test]
    fn mate_score_tt_rebase_roundtrip() {
        let score = MATE_SCORE - 7;
        assert_eq!(score_from_tt(score_to_tt(score, 4), 4), score);
        assert_eq!(score_from_tt(score_to_tt(-score, 9), 9), -score);
    }

    #[test]
    fn each_iteration_ages_the_table() {
        let board = Board::default();
        let tt = Arc::new(Tt::default());
        let stop = Arc::new(AtomicBool::new(false));
        let mut s = Searcher::new(Arc::clone(&tt), stop, TimeBudget::unlimited());
        s.run(&board, 3);
        assert_eq!(tt.generation(), 3);
    }

    #[test]
    fn stop_flag_aborts_with_truncation() {
        // The flag is polled every NODE_CHECK_INTERVAL nodes, so the
        // deepening loop aborts partway instead of reaching depth 12.
        let board = Board::default();
        let tt = Arc::new(Tt::default());
        let stop = Arc::new(AtomicBool::new(true));
        let mut s = Searcher::new(tt, stop, TimeBudget::unlimited());
        let out = s.run(&board, 12);
        assert!(out.truncated);
        if let Some(best) = out.best {
            assert!(best.depth < 12);
        }
    }
}
