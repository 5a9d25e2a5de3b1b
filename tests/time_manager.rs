use cozy_chess::Board;
use humine::search::{search, SearchConstraints};
use std::time::{Duration, Instant};

#[test]
fn movetime_bounds_the_search() {
    let board = Board::from_fen(
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
        false,
    )
    .unwrap();
    let constraints = SearchConstraints {
        max_depth: 64,
        time_limit: Duration::from_millis(300),
        workers: 1,
        tt_mb: 16,
    };
    let started = Instant::now();
    let report = search(&board, &constraints).unwrap();
    let elapsed = started.elapsed();

    // Polling every few thousand nodes keeps the overshoot small.
    assert!(
        elapsed < Duration::from_millis(1500),
        "search ran {:?} against a 300ms budget",
        elapsed
    );
    assert!(report.best_move.is_some());
    assert!(report.stats.depth_reached >= 1);
    assert!(report.stats.depth_reached < 64);
}

#[test]
fn tiny_budget_still_returns_a_move() {
    let board = Board::default();
    let constraints = SearchConstraints {
        max_depth: 64,
        time_limit: Duration::from_millis(1),
        workers: 1,
        tt_mb: 16,
    };
    let report = search(&board, &constraints).unwrap();
    assert!(report.best_move.is_some());
}
