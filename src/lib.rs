pub mod error;
pub mod eval;
pub mod search;
pub mod tactics;

// Re-exports cover the common call path: parse, search, report.
pub use error::EngineError;
pub use search::{apply_moves, parse_fen, search, SearchConstraints, SearchReport};
