//! Error types for the reactor status CLI
//!
//! Messages are shown to the operator as-is, so each one says what to check.

use reactor_ingest::{IngestError, StoreError};
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your REACTOR_* environment variables or .env file.")]
    Config(String),

    /// Ingest cycle failed
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Store command failed outside of an ingest
    #[error("Database error: {0}. Check your database connection settings.")]
    Store(#[from] StoreError),

    /// Terminal read or write failed
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the program must stop because of this error
    ///
    /// Store failures are reported and the menu resumes; a failed ingest
    /// only stops the program when the feed itself was unusable.
    pub fn is_fatal(&self) -> bool {
        match self {
            CliError::Ingest(e) => e.is_fatal(),
            CliError::Store(_) => false,
            CliError::Config(_) | CliError::Io(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let fetch = CliError::from(IngestError::Fetch {
            url: "http://localhost/feed.txt".to_string(),
            status: 404,
        });
        assert!(fetch.is_fatal());
        assert_eq!(
            fetch.to_string(),
            "Failed to fetch data from http://localhost/feed.txt. Status code: 404"
        );

        let insert = CliError::from(IngestError::Store(StoreError::EmptyInsert));
        assert!(!insert.is_fatal());

        let query = CliError::from(StoreError::MissingTable("reactor_status".to_string()));
        assert!(!query.is_fatal());

        assert!(CliError::config("port must be greater than 0").is_fatal());
    }
}
