//! Error type shared by every stage of a smart-grid run.

use thiserror::Error;

/// Errors produced while loading, optimizing or reporting a district.
#[derive(Error, Debug)]
pub enum GridError {
    /// One or more houses could not be connected to any battery, even after
    /// rebalancing. Carries the 1-based ids of the unplaced houses.
    #[error("capacity infeasible: {} house(s) could not be placed ({unplaced:?})", unplaced.len())]
    CapacityInfeasible { unplaced: Vec<u32> },

    /// An input row could not be parsed.
    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    /// Internal state broke an invariant. Always a bug.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results carrying a [`GridError`].
pub type GridResult<T> = Result<T, GridError>;
