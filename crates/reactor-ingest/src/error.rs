//! Error types for feed ingestion

use crate::store::StoreError;
use thiserror::Error;

/// Result type alias for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Failures of an ingest cycle
///
/// Fetch and header failures end the program; everything else is reported
/// and control returns to the caller. See [`IngestError::is_fatal`].
#[derive(Error, Debug)]
pub enum IngestError {
    /// The source answered with a non-success status
    #[error("Failed to fetch data from {url}. Status code: {status}")]
    Fetch { url: String, status: u16 },

    /// The request never produced a response
    #[error("Failed to fetch data: {0}")]
    Transport(#[from] reqwest::Error),

    /// First feed line is not `ReportDt|Unit|Power`
    #[error("Expected header: {expected:?}\nActual header: {actual:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl IngestError {
    /// Create a header mismatch error against the expected feed header
    pub fn header_mismatch(actual: Vec<String>) -> Self {
        Self::HeaderMismatch {
            expected: crate::parser::EXPECTED_HEADER
                .iter()
                .map(|s| s.to_string())
                .collect(),
            actual,
        }
    }

    /// Whether this failure must terminate the process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IngestError::Fetch { .. } | IngestError::Transport(_) | IngestError::HeaderMismatch { .. }
        )
    }
}
