//! Error types for the rast search library.

use thiserror::Error;

/// Primary error type for search and text-line extraction.
///
/// Branches that fail to converge within the split budget are not errors:
/// they are dropped by the engine and counted in
/// [`SearchStats::degenerate`](crate::search::SearchStats::degenerate).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RastError {
    /// Empty or malformed candidate set, or a malformed initial parameter box.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Thresholds that can never be met for the given input.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Convenience Result type alias for RastError.
pub type Result<T> = std::result::Result<T, RastError>;
