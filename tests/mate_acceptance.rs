use cozy_chess::Board;
use humine::search::alphabeta::MATE_SCORE;
use humine::search::{search, SearchConstraints};
use humine::tactics::TacticalFinding;
use std::time::Duration;

fn constraints(depth: u32) -> SearchConstraints {
    SearchConstraints {
        max_depth: depth,
        time_limit: Duration::from_secs(60),
        workers: 1,
        tt_mb: 16,
    }
}

#[test]
fn back_rank_mate_in_one() {
    let board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", false).unwrap();
    let report = search(&board, &constraints(6)).unwrap();
    assert_eq!(report.best_move.unwrap().to_string(), "a1a8");
    assert_eq!(report.score_cp, MATE_SCORE - 1);
    assert_eq!(report.mate_in, Some(1));
    assert!(
        report
            .findings
            .iter()
            .any(|f| matches!(f, TacticalFinding::MateIn { moves: 1, .. })),
        "mate should also surface as a finding"
    );
}

#[test]
fn two_rook_ladder_mate_in_two() {
    // No mate in one exists; the ladder forces mate on the next move.
    let board = Board::from_fen("7k/8/R7/1R6/8/8/8/K7 w - - 0 1", false).unwrap();
    let report = search(&board, &constraints(6)).unwrap();
    assert_eq!(report.score_cp, MATE_SCORE - 3);
    assert_eq!(report.mate_in, Some(2));
}

#[test]
fn being_mated_scores_negative() {
    // Black to move cannot stop the ladder; mated in two whatever is
    // played.
    let board = Board::from_fen("7k/8/R7/1R6/8/8/8/K7 b - - 0 1", false).unwrap();
    let report = search(&board, &constraints(6)).unwrap();
    assert_eq!(report.score_cp, -(MATE_SCORE - 4));
    assert_eq!(report.mate_in, Some(-2));
}

#[test]
fn shorter_mate_preferred() {
    // Both a slow and an instant mate exist; the score must be the
    // instant one.
    let board = Board::from_fen("6k1/5ppp/8/8/8/8/8/RR2K3 w - - 0 1", false).unwrap();
    let report = search(&board, &constraints(6)).unwrap();
    assert_eq!(report.mate_in, Some(1));
    assert_eq!(report.score_cp, MATE_SCORE - 1);
}
