//! Error types for prioritize-core.

use thiserror::Error;

/// Errors that can occur in prioritize operations.
///
/// Degraded report input never surfaces here; the parser substitutes
/// defaults instead. These variants cover configuration, feed decoding and
/// events that break the model's invariants.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for prioritize operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
