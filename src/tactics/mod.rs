//! Tactical pattern scanning: forks, pins, skewers, trapped pieces,
//! discovered attacks, and a shallow forced-mate prover.
//!
//! Findings annotate output and bias move ordering; they never feed the
//! numeric evaluation — tactical edges surface through search itself.

use cozy_chess::{BitBoard, Board, Color, Move, Piece, Square};
use serde::Serialize;
use std::fmt;

use crate::eval::piece_value;

/// One detected tactical pattern. Produced fresh per scan, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TacticalFinding {
    /// One piece attacks two or more targets worth more than itself,
    /// or the king plus anything.
    Fork {
        piece: String,
        from: String,
        targets: Vec<String>,
    },
    /// The front piece shields its king or something more valuable on
    /// the same ray.
    Pin {
        attacker: String,
        pinned: String,
        behind: String,
    },
    /// Same ray geometry, but the front piece is the more valuable one
    /// and must move, exposing what stands behind it.
    Skewer {
        attacker: String,
        front: String,
        behind: String,
    },
    /// An attacked piece with no move that does not lose material.
    Trapped { piece: String, square: String },
    /// A legal move that uncovers a standing slider's attack on a
    /// valuable target.
    Discovered {
        mv: String,
        slider: String,
        target: String,
    },
    /// Checkmate is forced within `moves` full moves; `mv` starts the
    /// line.
    MateIn { moves: u32, mv: String },
}

impl fmt::Display for TacticalFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TacticalFinding::Fork {
                piece,
                from,
                targets,
            } => write!(f, "{} on {} forks {}", piece, from, targets.join(", ")),
            TacticalFinding::Pin {
                attacker,
                pinned,
                behind,
            } => write!(f, "piece on {} is pinned by {} against {}", pinned, attacker, behind),
            TacticalFinding::Skewer {
                attacker,
                front,
                behind,
            } => write!(f, "{} skewers {} against {}", attacker, front, behind),
            TacticalFinding::Trapped { piece, square } => {
                write!(f, "{} on {} is trapped", piece, square)
            }
            TacticalFinding::Discovered { mv, slider, target } => {
                write!(f, "{} discovers an attack from {} on {}", mv, slider, target)
            }
            TacticalFinding::MateIn { moves, mv } => {
                write!(f, "mate in {} starting with {}", moves, mv)
            }
        }
    }
}

fn piece_name(piece: Piece) -> &'static str {
    match piece {
        Piece::Pawn => "pawn",
        Piece::Knight => "knight",
        Piece::Bishop => "bishop",
        Piece::Rook => "rook",
        Piece::Queen => "queen",
        Piece::King => "king",
    }
}

fn sq_name(sq: Square) -> String {
    format!("{}", sq)
}

/// Attack set of a single piece standing on `sq` given blockers `occ`.
fn attacks_from(piece: Piece, color: Color, sq: Square, occ: BitBoard) -> BitBoard {
    match piece {
        Piece::Pawn => cozy_chess::get_pawn_attacks(sq, color),
        Piece::Knight => cozy_chess::get_knight_moves(sq),
        Piece::Bishop => cozy_chess::get_bishop_moves(sq, occ),
        Piece::Rook => cozy_chess::get_rook_moves(sq, occ),
        Piece::Queen => {
            cozy_chess::get_bishop_moves(sq, occ) | cozy_chess::get_rook_moves(sq, occ)
        }
        Piece::King => cozy_chess::get_king_moves(sq),
    }
}

/// Every square `color` attacks, given blockers `occ`.
fn attacked_squares(board: &Board, color: Color, occ: BitBoard) -> BitBoard {
    let mut out = BitBoard::EMPTY;
    for sq in board.colors(color) & occ {
        if let Some(piece) = board.piece_on(sq) {
            out |= attacks_from(piece, color, sq, occ);
        }
    }
    out
}

// ── Fork ──────────────────────────────────────────────────────────────

/// Forks by either side's pieces. A canonical fork on the king is a
/// check, so the forked side is usually the one to move; scanning both
/// colors keeps the annotation independent of whose turn it is.
pub fn find_forks(board: &Board) -> Vec<TacticalFinding> {
    let mut findings = find_forks_by(board, Color::White);
    findings.extend(find_forks_by(board, Color::Black));
    findings
}

fn find_forks_by(board: &Board, us: Color) -> Vec<TacticalFinding> {
    let them = !us;
    let occ = board.occupied();
    let enemy = board.colors(them);
    let enemy_king = board.king(them);

    let mut findings = Vec::new();
    for from in board.colors(us) {
        let piece = match board.piece_on(from) {
            Some(Piece::King) | None => continue,
            Some(p) => p,
        };
        let targets = attacks_from(piece, us, from, occ) & enemy;
        if targets.len() < 2 {
            continue;
        }
        let hits_king = targets.has(enemy_king);
        let mut values: Vec<i32> = targets
            .into_iter()
            .filter(|&t| t != enemy_king)
            .map(|t| piece_value(board.piece_on(t).unwrap_or(Piece::Pawn)))
            .collect();
        values.sort_unstable_by(|a, b| b.cmp(a));
        let qualifies = if hits_king {
            !values.is_empty()
        } else {
            values.len() >= 2 && values[0] + values[1] > piece_value(piece)
        };
        if qualifies {
            findings.push(TacticalFinding::Fork {
                piece: piece_name(piece).to_string(),
                from: sq_name(from),
                targets: targets.into_iter().map(sq_name).collect(),
            });
        }
    }
    findings
}

// ── Pin and skewer ────────────────────────────────────────────────────

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

fn ray_first_two(
    board: &Board,
    from: Square,
    dir: (i8, i8),
) -> Option<(Square, Square)> {
    let occ = board.occupied();
    let mut cur = from;
    let mut first = None;
    loop {
        cur = cur.try_offset(dir.0, dir.1)?;
        if occ.has(cur) {
            match first {
                None => first = Some(cur),
                Some(f) => return Some((f, cur)),
            }
        }
    }
}

/// Pins and skewers created by either side's sliders. Shared ray
/// geometry; relative value decides which pattern it is.
pub fn find_pins_and_skewers(board: &Board) -> Vec<TacticalFinding> {
    let mut findings = find_pins_and_skewers_by(board, Color::White);
    findings.extend(find_pins_and_skewers_by(board, Color::Black));
    findings
}

fn find_pins_and_skewers_by(board: &Board, us: Color) -> Vec<TacticalFinding> {
    let them = board.colors(!us);
    let enemy_king = board.king(!us);

    let mut findings = Vec::new();
    let sliders = (board.pieces(Piece::Bishop)
        | board.pieces(Piece::Rook)
        | board.pieces(Piece::Queen))
        & board.colors(us);

    for from in sliders {
        let piece = board.piece_on(from).unwrap();
        let dirs: &[(i8, i8)] = match piece {
            Piece::Bishop => &BISHOP_DIRS,
            Piece::Rook => &ROOK_DIRS,
            _ => &[
                (1, 0),
                (-1, 0),
                (0, 1),
                (0, -1),
                (1, 1),
                (1, -1),
                (-1, 1),
                (-1, -1),
            ],
        };
        for &dir in dirs {
            let Some((front, behind)) = ray_first_two(board, from, dir) else {
                continue;
            };
            if !them.has(front) || !them.has(behind) {
                continue;
            }
            let front_piece = board.piece_on(front).unwrap_or(Piece::Pawn);
            let behind_piece = board.piece_on(behind).unwrap_or(Piece::Pawn);
            if behind == enemy_king || piece_value(behind_piece) > piece_value(front_piece)
            {
                findings.push(TacticalFinding::Pin {
                    attacker: sq_name(from),
                    pinned: sq_name(front),
                    behind: sq_name(behind),
                });
            } else {
                findings.push(TacticalFinding::Skewer {
                    attacker: sq_name(from),
                    front: sq_name(front),
                    behind: sq_name(behind),
                });
            }
        }
    }
    findings
}

// ── Trapped pieces ────────────────────────────────────────────────────

/// Side to move's attacked pieces with no move that holds material.
pub fn find_trapped(board: &Board) -> Vec<TacticalFinding> {
    let us = board.side_to_move();
    let them = !us;
    let occ = board.occupied();
    let enemy_attacks = attacked_squares(board, them, occ);
    let own_attacks = attacked_squares(board, us, occ);

    let mut moves_by_from: Vec<(Square, Move)> = Vec::new();
    board.generate_moves(|ml| {
        for m in ml {
            moves_by_from.push((m.from, m));
        }
        false
    });

    let candidates =
        board.colors(us) & !(board.pieces(Piece::Pawn) | board.pieces(Piece::King));
    let mut findings = Vec::new();
    for sq in candidates {
        if !enemy_attacks.has(sq) {
            continue;
        }
        let piece = board.piece_on(sq).unwrap();
        let value = piece_value(piece);

        // Standing still loses material when a cheaper attacker or an
        // undefended square is involved.
        let cheapest_attacker = cheapest_attacker_value(board, them, sq, occ);
        let threatened = match cheapest_attacker {
            Some(v) => v < value || !own_attacks.has(sq),
            None => false,
        };
        if !threatened {
            continue;
        }

        let has_safe_move = moves_by_from.iter().any(|&(from, m)| {
            if from != sq {
                return false;
            }
            let capture_gain = board
                .piece_on(m.to)
                .map(piece_value)
                .unwrap_or(0);
            capture_gain >= value || !enemy_attacks.has(m.to)
        });
        if !has_safe_move {
            findings.push(TacticalFinding::Trapped {
                piece: piece_name(piece).to_string(),
                square: sq_name(sq),
            });
        }
    }
    findings
}

fn cheapest_attacker_value(
    board: &Board,
    by: Color,
    target: Square,
    occ: BitBoard,
) -> Option<i32> {
    let mut best = None;
    for sq in board.colors(by) & occ {
        let piece = board.piece_on(sq)?;
        if attacks_from(piece, by, sq, occ).has(target) {
            let v = piece_value(piece);
            best = Some(best.map_or(v, |b: i32| b.min(v)));
        }
    }
    best
}

// ── Discovered attacks ────────────────────────────────────────────────

/// Legal moves of the side to move that uncover a standing slider's
/// attack on a piece worth a rook or more, or the king.
pub fn find_discovered(board: &Board) -> Vec<TacticalFinding> {
    let us = board.side_to_move();
    let them = board.colors(!us);
    let occ = board.occupied();
    let enemy_king = board.king(!us);

    let sliders = (board.pieces(Piece::Bishop)
        | board.pieces(Piece::Rook)
        | board.pieces(Piece::Queen))
        & board.colors(us);

    let mut moves = Vec::new();
    board.generate_moves(|ml| {
        for m in ml {
            moves.push(m);
        }
        false
    });

    let mut findings = Vec::new();
    for m in moves {
        if sliders.has(m.from) {
            // The slider moving is a direct attack, not a discovery.
            continue;
        }
        let mut after = occ & !BitBoard(1 << m.from as usize);
        after |= BitBoard(1 << m.to as usize);
        for s in sliders {
            let piece = board.piece_on(s).unwrap();
            let before_bb = attacks_from(piece, us, s, occ);
            let after_bb = attacks_from(piece, us, s, after);
            let uncovered = after_bb & !before_bb & them & !BitBoard(1 << m.to as usize);
            for target in uncovered {
                let tp = board.piece_on(target).unwrap_or(Piece::Pawn);
                if target == enemy_king || piece_value(tp) >= crate::eval::ROOK_VALUE {
                    findings.push(TacticalFinding::Discovered {
                        mv: format!("{}", m),
                        slider: sq_name(s),
                        target: sq_name(target),
                    });
                }
            }
        }
    }
    findings
}

// ── Forced mate ───────────────────────────────────────────────────────

fn has_any_move(board: &Board) -> bool {
    let mut any = false;
    board.generate_moves(|_| {
        any = true;
        true
    });
    any
}

fn is_checkmate(board: &Board) -> bool {
    !board.checkers().is_empty() && !has_any_move(board)
}

/// Prove the side to move forces mate within `plies` plies (odd).
/// A fixed shallow search, separate from the main iterative deepening.
/// Returns the first move of the mating line.
pub fn find_forced_mate(board: &Board, plies: u32) -> Option<(Move, u32)> {
    let mut depth = 1;
    while depth <= plies {
        if let Some(mv) = mate_in(board, depth) {
            return Some((mv, (depth + 1) / 2));
        }
        depth += 2;
    }
    None
}

fn mate_in(board: &Board, plies: u32) -> Option<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|ml| {
        for m in ml {
            moves.push(m);
        }
        false
    });
    for &m in &moves {
        let mut child = board.clone();
        child.play(m);
        if is_checkmate(&child) {
            return Some(m);
        }
    }
    if plies < 3 {
        return None;
    }
    for &m in &moves {
        let mut child = board.clone();
        child.play(m);
        // Only checking moves sustain a forced line this shallow.
        if child.checkers().is_empty() {
            continue;
        }
        if all_replies_mated(&child, plies - 2) {
            return Some(m);
        }
    }
    None
}

fn all_replies_mated(board: &Board, plies: u32) -> bool {
    let mut replies = Vec::new();
    board.generate_moves(|ml| {
        for m in ml {
            replies.push(m);
        }
        false
    });
    if replies.is_empty() {
        // Stalemate escapes; checkmate was already counted a ply ago.
        return false;
    }
    replies.iter().all(|&r| {
        let mut child = board.clone();
        child.play(r);
        mate_in(&child, plies).is_some()
    })
}

/// Default ply horizon for the standalone tactics scan (mate in two).
pub const MATE_SCAN_PLIES: u32 = 3;

/// Run every pattern scan over the position.
pub fn scan_tactics(board: &Board) -> Vec<TacticalFinding> {
    let mut findings = Vec::new();
    if let Some((mv, moves)) = find_forced_mate(board, MATE_SCAN_PLIES) {
        findings.push(TacticalFinding::MateIn {
            moves,
            mv: format!("{}", mv),
        });
    }
    findings.extend(find_forks(board));
    findings.extend(find_pins_and_skewers(board));
    findings.extend(find_trapped(board));
    findings.extend(find_discovered(board));
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_fork_on_king_and_queen() {
        // Knight on f7 forks Kh8 and Qd8; Black to move, in check.
        let b = Board::from_fen("3q3k/5N2/8/8/8/8/8/4K3 b - - 0 1", false).unwrap();
        let forks = find_forks(&b);
        assert!(
            forks.iter().any(|f| matches!(
                f,
                TacticalFinding::Fork { from, targets, .. }
                    if from == "f7"
                        && targets.contains(&"d8".to_string())
                        && targets.contains(&"h8".to_string())
            )),
            "expected Nf7 fork, got {:?}",
            forks
        );
    }

    #[test]
    fn absolute_pin_detected() {
        // White rook on e1, black knight e4 shields the king on e8.
        let b = Board::from_fen("4k3/8/8/8/4n3/8/8/4RK2 w - - 0 1", false).unwrap();
        let found = find_pins_and_skewers(&b);
        assert!(
            found.iter().any(|f| matches!(
                f,
                TacticalFinding::Pin { pinned, behind, .. }
                    if pinned == "e4" && behind == "e8"
            )),
            "expected pin on e4, got {:?}",
            found
        );
    }

    #[test]
    fn skewer_detected_when_front_is_more_valuable() {
        // White rook e1, black queen e5 with a bishop behind on e7.
        let b = Board::from_fen("k7/4b3/8/4q3/8/8/8/4RK2 w - - 0 1", false).unwrap();
        let found = find_pins_and_skewers(&b);
        assert!(
            found.iter().any(|f| matches!(
                f,
                TacticalFinding::Skewer { front, behind, .. }
                    if front == "e5" && behind == "e7"
            )),
            "expected skewer through e5, got {:?}",
            found
        );
    }

    #[test]
    fn mate_in_one_proven() {
        // Back-rank mate: Ra8#.
        let b = Board::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", false).unwrap();
        let found = find_forced_mate(&b, 1).expect("mate in 1 exists");
        assert_eq!(format!("{}", found.0), "a1a8");
        assert_eq!(found.1, 1);
    }

    #[test]
    fn no_mate_in_quiet_position() {
        assert!(find_forced_mate(&Board::default(), 3).is_none());
    }
}
