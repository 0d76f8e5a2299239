//! Error types for status record conversion

use thiserror::Error;

/// Result type alias for record conversion
pub type Result<T> = std::result::Result<T, RecordError>;

/// Why a single source row could not become a [`crate::StatusRecord`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("unreadable row: {0}")]
    Unreadable(String),

    #[error("invalid report timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid power level '{value}': {source}")]
    Power {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}
