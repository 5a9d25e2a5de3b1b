use anyhow::Result;
use clap::Parser;
use cozy_chess::Board;
use std::time::Duration;

use humine::search::{self, SearchConstraints};
use humine::tactics;

#[derive(Parser, Debug)]
#[command(author, version, about = "Alpha-beta chess search with tactical annotations", long_about = None)]
struct Args {
    /// Starting position as FEN (standard initial position if omitted)
    #[arg(long)]
    fen: Option<String>,

    /// Moves to play from the starting position, in coordinate notation
    #[arg(long, num_args = 0.., value_delimiter = ' ')]
    moves: Vec<String>,

    /// Maximum search depth in plies
    #[arg(long, default_value_t = 8)]
    depth: u32,

    /// Wall-clock budget in milliseconds
    #[arg(long, default_value_t = 30_000)]
    movetime_ms: u64,

    /// Search worker threads (0 picks one less than the core count)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Only scan for tactical patterns, no search
    #[arg(long)]
    tactics: bool,

    /// Only print the static evaluation, no search
    #[arg(long)]
    eval: bool,

    /// Emit JSON instead of plain text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let board = match &args.fen {
        Some(fen) => search::parse_fen(fen)?,
        None => Board::default(),
    };
    let board = search::apply_moves(&board, &args.moves)?;

    if args.eval {
        let score = humine::eval::evaluate(&board);
        if args.json {
            println!("{}", serde_json::json!({ "eval_cp": score }));
        } else {
            println!("eval {} cp", score);
        }
        return Ok(());
    }

    if args.tactics {
        let findings = tactics::scan_tactics(&board);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&findings)?);
        } else if findings.is_empty() {
            println!("no tactics found");
        } else {
            for f in &findings {
                println!("{}", f);
            }
        }
        return Ok(());
    }

    let mut constraints = SearchConstraints {
        max_depth: args.depth,
        time_limit: Duration::from_millis(args.movetime_ms),
        ..SearchConstraints::default()
    };
    if args.threads > 0 {
        constraints.workers = args.threads;
    }

    let report = search::search(&board, &constraints)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let best = report
        .best_move
        .map(|m| m.to_string())
        .unwrap_or_else(|| "(none)".to_string());
    match report.mate_in {
        Some(m) => println!("bestmove {} mate {}", best, m),
        None => println!("bestmove {} score {} cp", best, report.score_cp),
    }
    let pv: Vec<String> = report.pv.iter().map(|m| m.to_string()).collect();
    println!("pv {}", pv.join(" "));
    println!(
        "depth {} nodes {} tt_hits {} elapsed {} ms{}",
        report.stats.depth_reached,
        report.stats.nodes,
        report.stats.tt_hits,
        report.stats.elapsed_ms,
        if report.stats.truncated {
            " (time limit)"
        } else {
            ""
        }
    );
    for f in &report.findings {
        println!("tactic: {}", f);
    }
    Ok(())
}
