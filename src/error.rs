//! Error types for MindPulse Core

use thiserror::Error;

/// Errors that can occur in the scoring and persistence pipeline.
///
/// Insufficient data for a score is deliberately NOT an error: the engine
/// returns the [`StressScore::INSUFFICIENT`](crate::StressScore::INSUFFICIENT)
/// sentinel, a valid domain value.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("store access failed: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("store worker is no longer running")]
    StoreUnavailable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid stored date: {0}")]
    DateParseError(String),

    #[error("invalid stored id: {0}")]
    IdParseError(String),

    #[error("stored score out of range: {0}")]
    ScoreOutOfRange(i64),
}
