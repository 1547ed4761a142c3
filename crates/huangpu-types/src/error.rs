//! Error types for huangpu.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for huangpu operations.
pub type Result<T> = std::result::Result<T, HuangpuError>;

/// Errors that can occur during audit and ingestion runs.
#[derive(Error, Debug)]
pub enum HuangpuError {
    /// Upstream provider transport failure.
    #[error("Source error: {0}")]
    Source(String),

    /// Storage collaborator failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Trading-calendar fetch failure.
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// Unknown provider identifier.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Corporate-action event with a non-positive ratio.
    #[error("Non-positive adjustment ratio {ratio} for {symbol} on {date}")]
    NonPositiveRatio {
        /// The instrument carrying the bad event.
        symbol: String,
        /// The event date.
        date: NaiveDate,
        /// The offending ratio value.
        ratio: f64,
    },

    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}
