//! Position hashing: full recompute plus an XOR delta for incremental
//! updates alongside the rules engine's make/unmake.

use cozy_chess::{Board, Color, File, Piece};
use std::sync::OnceLock;

fn piece_index(color: Color, piece: Piece) -> usize {
    let c = if color == Color::White { 0 } else { 1 };
    c * 6 + piece as usize
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// Key layout: 12*64 piece-square keys, 1 side key, 4 castling keys
// (white/black x short/long), 8 en-passant file keys.
const PIECE_KEYS: usize = 12 * 64;
const TOTAL_KEYS: usize = PIECE_KEYS + 1 + 4 + 8;

static TABLE: OnceLock<[u64; TOTAL_KEYS]> = OnceLock::new();

fn table() -> &'static [u64; TOTAL_KEYS] {
    TABLE.get_or_init(|| {
        let mut t = [0u64; TOTAL_KEYS];
        let mut seed = 0xF00D_F00D_DEAD_BEEF;
        for v in &mut t {
            seed = splitmix64(seed);
            *v = seed;
        }
        t
    })
}

fn side_key() -> u64 {
    table()[PIECE_KEYS]
}

fn castle_key(color: Color, short: bool) -> u64 {
    let c = if color == Color::White { 0 } else { 1 };
    let s = if short { 0 } else { 1 };
    table()[PIECE_KEYS + 1 + c * 2 + s]
}

fn ep_key(file: File) -> u64 {
    table()[PIECE_KEYS + 5 + file as usize]
}

/// Structural hash of a position: occupancy, side to move, castling
/// rights, en-passant file. Never mutates the board.
pub fn hash(board: &Board) -> u64 {
    let t = table();
    let mut key = 0u64;
    for &color in &[Color::White, Color::Black] {
        for &piece in &Piece::ALL {
            let bb = board.colors(color) & board.pieces(piece);
            for sq in bb {
                key ^= t[piece_index(color, piece) * 64 + sq as usize];
            }
        }
    }
    if board.side_to_move() == Color::Black {
        key ^= side_key();
    }
    for &color in &[Color::White, Color::Black] {
        let rights = board.castle_rights(color);
        if rights.short.is_some() {
            key ^= castle_key(color, true);
        }
        if rights.long.is_some() {
            key ^= castle_key(color, false);
        }
    }
    if let Some(file) = board.en_passant() {
        key ^= ep_key(file);
    }
    key
}

/// XOR difference between a position and its successor after one move.
///
/// Built once per make; `apply` and `revert` are both XOR, so applying
/// then reverting restores the original key bit-for-bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashDelta(u64);

impl HashDelta {
    /// Capture the delta of the move that turned `parent` into `child`.
    ///
    /// Diffs the twelve piece sets directly, which covers captures,
    /// promotions, castling, and en passant with one code path.
    pub fn between(parent: &Board, child: &Board) -> HashDelta {
        let t = table();
        let mut delta = side_key();
        for &color in &[Color::White, Color::Black] {
            for &piece in &Piece::ALL {
                let before = parent.colors(color) & parent.pieces(piece);
                let after = child.colors(color) & child.pieces(piece);
                for sq in before ^ after {
                    delta ^= t[piece_index(color, piece) * 64 + sq as usize];
                }
            }
            let before = parent.castle_rights(color);
            let after = child.castle_rights(color);
            if before.short.is_some() != after.short.is_some() {
                delta ^= castle_key(color, true);
            }
            if before.long.is_some() != after.long.is_some() {
                delta ^= castle_key(color, false);
            }
        }
        if parent.en_passant() != child.en_passant() {
            if let Some(file) = parent.en_passant() {
                delta ^= ep_key(file);
            }
            if let Some(file) = child.en_passant() {
                delta ^= ep_key(file);
            }
        }
        HashDelta(delta)
    }
}

/// Advance a key across a move.
pub fn apply(key: u64, delta: HashDelta) -> u64 {
    key ^ delta.0
}

/// Undo `apply`. XOR is its own inverse, so this is the same operation.
pub fn revert(key: u64, delta: HashDelta) -> u64 {
    key ^ delta.0
}
