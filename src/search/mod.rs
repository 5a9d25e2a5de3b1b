//! Game-tree search: iterative-deepening negamax over a shared
//! transposition table, with an optional parallel root.

pub mod alphabeta;
pub mod ordering;
pub mod parallel;
pub mod time;
pub mod tt;
pub mod zobrist;

use cozy_chess::{Board, Move};
use serde::{Serialize, Serializer};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::EngineError;
use crate::search::alphabeta::{moves_to_mate, Searcher, MATE_SCORE};
use crate::search::parallel::search_parallel;
use crate::search::time::TimeBudget;
use crate::search::tt::Tt;
use crate::tactics::{self, TacticalFinding};

/// Limits for one top-level search call.
#[derive(Clone, Copy, Debug)]
pub struct SearchConstraints {
    pub max_depth: u32,
    pub time_limit: Duration,
    pub workers: usize,
    pub tt_mb: usize,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1);
        Self {
            max_depth: 8,
            time_limit: Duration::from_secs(30),
            workers,
            tt_mb: 64,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct SearchStats {
    pub nodes: u64,
    pub tt_hits: u64,
    pub depth_reached: u32,
    pub truncated: bool,
    pub elapsed_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchReport {
    #[serde(serialize_with = "ser_opt_move")]
    pub best_move: Option<Move>,
    pub score_cp: i32,
    /// Signed full moves to mate when `score_cp` is a mate score.
    pub mate_in: Option<i32>,
    #[serde(serialize_with = "ser_moves")]
    pub pv: Vec<Move>,
    pub findings: Vec<TacticalFinding>,
    pub stats: SearchStats,
}

fn ser_opt_move<S: Serializer>(mv: &Option<Move>, s: S) -> Result<S::Ok, S::Error> {
    match mv {
        Some(m) => s.serialize_some(&m.to_string()),
        None => s.serialize_none(),
    }
}

fn ser_moves<S: Serializer>(moves: &Vec<Move>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(moves.iter().map(|m| m.to_string()))
}

/// Parse a FEN string into a position.
pub fn parse_fen(fen: &str) -> Result<Board, EngineError> {
    Board::from_fen(fen, false).map_err(|e| EngineError::Position(format!("{:?}: {}", e, fen)))
}

/// Castling is generated as a king-to-rook move; accept the two-square
/// king step spelling as an alias.
fn castling_alias(text: &str) -> Option<&'static str> {
    match text {
        "e1g1" => Some("e1h1"),
        "e1c1" => Some("e1a1"),
        "e8g8" => Some("e8h8"),
        "e8c8" => Some("e8a8"),
        _ => None,
    }
}

/// Play a sequence of moves in coordinate notation on top of `board`.
/// A move is legal iff it matches one the rules engine generates.
pub fn apply_moves(board: &Board, moves: &[String]) -> Result<Board, EngineError> {
    let mut cur = board.clone();
    for (i, text) in moves.iter().enumerate() {
        let mut found = None;
        cur.generate_moves(|ml| {
            for m in ml {
                if m.to_string() == *text {
                    found = Some(m);
                    break;
                }
            }
            found.is_some()
        });
        if found.is_none() {
            if let Some(alias) = castling_alias(text) {
                cur.generate_moves(|ml| {
                    for m in ml {
                        if m.to_string() == alias
                            && cur.piece_on(m.from) == Some(cozy_chess::Piece::King)
                        {
                            found = Some(m);
                            break;
                        }
                    }
                    found.is_some()
                });
            }
        }
        match found {
            Some(m) => cur.play(m),
            None => {
                return Err(EngineError::IllegalMove {
                    mv: text.clone(),
                    ply: i as u32,
                })
            }
        }
    }
    Ok(cur)
}

fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|ml| {
        for m in ml {
            moves.push(m);
        }
        false
    });
    moves
}

/// Recover the principal variation by replaying best moves out of the
/// transposition table. Stops on a miss, an illegal suggestion, or a
/// repeated position, so a cyclic table cannot loop it forever.
fn extract_pv(board: &Board, tt: &Tt, max_len: usize) -> Vec<Move> {
    let mut pv = Vec::new();
    let mut cur = board.clone();
    let mut seen = vec![zobrist::hash(&cur)];
    while pv.len() < max_len {
        let Some(entry) = tt.probe(*seen.last().unwrap()) else {
            break;
        };
        let Some(mv) = entry.best else {
            break;
        };
        if !legal_moves(&cur).contains(&mv) {
            break;
        }
        cur.play(mv);
        let key = zobrist::hash(&cur);
        if seen.contains(&key) {
            break;
        }
        pv.push(mv);
        seen.push(key);
    }
    pv
}

/// Search `board` under `constraints` and report the best line found.
///
/// A position with no legal moves is an error; otherwise the report
/// always names a legal move, falling back to the first generated one
/// if the budget expires before depth 1 completes.
pub fn search(board: &Board, constraints: &SearchConstraints) -> Result<SearchReport, EngineError> {
    let moves = legal_moves(board);
    if moves.is_empty() {
        return Err(EngineError::NoLegalMoves);
    }

    let budget = TimeBudget::new(constraints.time_limit);
    let findings = tactics::scan_tactics(board);

    // A mate in one needs no deepening loop.
    if let Some((mv, 1)) = tactics::find_forced_mate(board, 1) {
        return Ok(SearchReport {
            best_move: Some(mv),
            score_cp: MATE_SCORE - 1,
            mate_in: Some(1),
            pv: vec![mv],
            findings,
            stats: SearchStats {
                depth_reached: 1,
                elapsed_ms: budget.elapsed().as_millis() as u64,
                ..SearchStats::default()
            },
        });
    }

    let tt = Arc::new(Tt::with_capacity_mb(constraints.tt_mb));

    let outcome = if constraints.workers > 1 {
        search_parallel(
            board,
            Arc::clone(&tt),
            budget,
            constraints.max_depth,
            constraints.workers,
        )
    } else {
        let stop = Arc::new(AtomicBool::new(false));
        let mut searcher = Searcher::new(Arc::clone(&tt), stop, budget);
        searcher.run(board, constraints.max_depth)
    };

    let (best_move, score_cp, depth_reached) = match outcome.best {
        Some(iter) => (iter.best_move, iter.score, iter.depth),
        // Budget gone before depth 1 finished; any legal move beats none.
        None => (moves[0], 0, 0),
    };

    let mut pv = extract_pv(board, &tt, 32);
    if pv.first() != Some(&best_move) {
        pv = vec![best_move];
    }

    Ok(SearchReport {
        best_move: Some(best_move),
        score_cp,
        mate_in: moves_to_mate(score_cp),
        pv,
        findings,
        stats: SearchStats {
            nodes: outcome.nodes,
            tt_hits: outcome.tt_hits,
            depth_reached,
            truncated: outcome.truncated,
            elapsed_ms: budget.elapsed().as_millis() as u64,
        },
    })
}
