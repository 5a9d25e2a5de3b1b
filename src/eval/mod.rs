//! Static evaluation in centipawns, positive for the side to move.

pub mod king_safety;
pub mod pawns;
pub mod pst;

use cozy_chess::{Board, Color, Piece};

pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => 20_000,
    }
}

fn material(board: &Board, color: Color) -> i32 {
    let us = board.colors(color);
    let mut total = 0;
    for &piece in &[
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
    ] {
        total += (board.pieces(piece) & us).len() as i32 * piece_value(piece);
    }
    total
}

/// Attack-set mobility for minor and major pieces, scaled to centipawns.
/// Squares occupied by friendly pieces do not count.
fn mobility(board: &Board, color: Color) -> i32 {
    let occ = board.occupied();
    let us = board.colors(color);
    let mut m = 0;
    for &piece in &[Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
        for sq in board.pieces(piece) & us {
            let attacks = match piece {
                Piece::Knight => cozy_chess::get_knight_moves(sq),
                Piece::Bishop => cozy_chess::get_bishop_moves(sq, occ),
                Piece::Rook => cozy_chess::get_rook_moves(sq, occ),
                Piece::Queen => {
                    cozy_chess::get_bishop_moves(sq, occ)
                        | cozy_chess::get_rook_moves(sq, occ)
                }
                _ => unreachable!(),
            };
            m += (attacks & !us).len() as i32;
        }
    }
    m * 2
}

/// Static score of the position from the side to move's perspective
/// (negamax convention). Deterministic and side-effect-free.
pub fn evaluate(board: &Board) -> i32 {
    let phase = pst::game_phase(board);

    let mut white = 0;
    white += material(board, Color::White) - material(board, Color::Black);
    for sq in board.occupied() {
        let piece = board.piece_on(sq).unwrap();
        let color = board.color_on(sq).unwrap();
        let v = pst::pst_value(piece, color, sq, phase);
        if color == Color::White {
            white += v;
        } else {
            white -= v;
        }
    }
    white += pawns::pawn_structure(board, Color::White)
        - pawns::pawn_structure(board, Color::Black);
    white += king_safety::king_safety(board, Color::White)
        - king_safety::king_safety(board, Color::Black);
    white += mobility(board, Color::White) - mobility(board, Color::Black);

    if board.side_to_move() == Color::White {
        white
    } else {
        -white
    }
}
