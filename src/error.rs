use thiserror::Error;

/// Engine-level failures surfaced to callers.
///
/// A search that hits its hard time limit is not an error: it returns a
/// normal report with `stats.truncated` set.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed FEN, propagated from the rules engine unchanged.
    #[error("invalid position: {0}")]
    Position(String),

    /// A move in a requested sequence is not legal in its position.
    #[error("illegal move {mv} at ply {ply}")]
    IllegalMove { mv: String, ply: u32 },

    /// A search was requested on a terminal position; there is no move
    /// to report.
    #[error("no legal moves in the given position")]
    NoLegalMoves,
}
