use cozy_chess::Board;
use humine::search::alphabeta::MATE_SCORE;
use humine::search::{search, SearchConstraints};
use std::time::Duration;

fn constraints(workers: usize) -> SearchConstraints {
    SearchConstraints {
        max_depth: 6,
        time_limit: Duration::from_secs(60),
        workers,
        tt_mb: 16,
    }
}

#[test]
fn parallel_search_finds_the_forced_mate() {
    let board = Board::from_fen("7k/8/R7/1R6/8/8/8/K7 w - - 0 1", false).unwrap();
    let report = search(&board, &constraints(4)).unwrap();
    assert_eq!(report.score_cp, MATE_SCORE - 3);
    assert_eq!(report.mate_in, Some(2));
}

#[test]
fn worker_counts_agree_on_a_tactic() {
    let board = Board::from_fen("3q2k1/8/8/8/8/8/8/3R2K1 w - - 0 1", false).unwrap();
    let solo = search(&board, &constraints(1)).unwrap();
    let team = search(&board, &constraints(4)).unwrap();
    assert_eq!(solo.best_move.unwrap().to_string(), "d1d8");
    assert_eq!(team.best_move.unwrap().to_string(), "d1d8");
}

#[test]
fn parallel_report_is_well_formed() {
    let board = Board::default();
    let report = search(&board, &constraints(3)).unwrap();
    assert!(report.best_move.is_some());
    assert!(report.stats.nodes > 0);
    assert!(report.stats.depth_reached >= 1);
    assert_eq!(report.pv.first(), Some(&report.best_move.unwrap()));
}
