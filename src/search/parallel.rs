//! Parallel root search: every worker runs the full deepening loop on
//! its own `Searcher`, sharing the transposition table and a stop flag.
//!
//! Workers diverge naturally through table timing, so they explore
//! different subtrees; whoever completes the deepest iteration wins.

use cozy_chess::Board;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::search::alphabeta::{SearchOutcome, Searcher};
use crate::search::time::TimeBudget;
use crate::search::tt::Tt;

/// Fan out `workers` deepening searches and merge their outcomes.
///
/// The first worker to finish its loop raises the stop flag, which
/// bounds the straggler overhead to one polling interval each.
pub fn search_parallel(
    board: &Board,
    tt: Arc<Tt>,
    budget: TimeBudget,
    max_depth: u32,
    workers: usize,
) -> SearchOutcome {
    let workers = workers.max(1);
    let stop = Arc::new(AtomicBool::new(false));

    let outcomes: Vec<SearchOutcome> = (0..workers)
        .into_par_iter()
        .map(|_| {
            let mut searcher =
                Searcher::new(Arc::clone(&tt), Arc::clone(&stop), budget);
            let outcome = searcher.run(board, max_depth);
            stop.store(true, Ordering::Relaxed);
            outcome
        })
        .collect();

    merge(outcomes)
}

/// Deepest completed iteration wins; score breaks ties. Node and table
/// counters sum across workers. `truncated` follows the winning worker:
/// losers are stopped on purpose once a winner finishes.
fn merge(outcomes: Vec<SearchOutcome>) -> SearchOutcome {
    let mut merged = SearchOutcome {
        best: None,
        truncated: false,
        nodes: 0,
        tt_hits: 0,
    };
    for out in outcomes {
        merged.nodes += out.nodes;
        merged.tt_hits += out.tt_hits;
        match (merged.best, out.best) {
            (None, None) => merged.truncated |= out.truncated,
            (Some(_), None) => {}
            (None, Some(_)) => {
                merged.best = out.best;
                merged.truncated = out.truncated;
            }
            (Some(a), Some(b)) => {
                if (b.depth, b.score) > (a.depth, a.score) {
                    merged.best = out.best;
                    merged.truncated = out.truncated;
                }
            }
        }
    }
    merged
}
