//! Dataset store interface
//!
//! A single table of [`StatusRecord`]s. Every read is expressed as a typed
//! method with bound parameters, so user-supplied identifiers and dates
//! never become part of SQL text.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStatusStore;
pub use postgres::{create_pool, DbConfig, PgStatusStore};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reactor_common::{StatusRecord, UnitOutage};
use thiserror::Error;

/// Table name used when none is configured.
pub const DEFAULT_TABLE_NAME: &str = "reactor_status";

/// Store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The status table has been dropped and not yet recreated
    #[error("Table '{0}' does not exist. Re-retrieve the data to recreate it.")]
    MissingTable(String),

    /// Bulk insert called with no rows
    #[error("No rows to insert")]
    EmptyInsert,

    /// Configured table name is not a plain SQL identifier
    #[error("Invalid table name '{0}': use letters, digits and underscores only")]
    InvalidTableName(String),

    #[error("Database configuration error: {0}")]
    Config(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Tabular store holding the status dataset
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Drop the status table if it exists
    async fn drop_table(&self) -> StoreResult<()>;

    /// Create the status table
    async fn create_table(&self) -> StoreResult<()>;

    /// Insert all records as one unit of work. Returns the number of rows
    /// written. An empty slice is rejected with [`StoreError::EmptyInsert`].
    async fn bulk_insert(&self, records: &[StatusRecord]) -> StoreResult<u64>;

    /// Distinct unit identifiers, sorted
    async fn list_units(&self) -> StoreResult<Vec<String>>;

    /// Whether any row carries exactly this unit identifier
    async fn unit_exists(&self, unit: &str) -> StoreResult<bool>;

    /// Most recent record for `unit` reported at or before `as_of`
    async fn latest_status(
        &self,
        unit: &str,
        as_of: NaiveDateTime,
    ) -> StoreResult<Option<StatusRecord>>;

    /// Number of zero-power rows for `unit` across the whole dataset
    async fn outage_count(&self, unit: &str) -> StoreResult<i64>;

    /// Timestamp of the most recent zero-power row for `unit`
    async fn last_outage(&self, unit: &str) -> StoreResult<Option<NaiveDateTime>>;

    /// Earliest and latest report timestamps, or `None` when empty
    async fn date_bounds(&self) -> StoreResult<Option<(NaiveDateTime, NaiveDateTime)>>;

    /// Zero-power row counts per unit for report dates in `[start, end]`.
    /// Units without outages in the window are absent. Sorted by unit.
    async fn outages_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<UnitOutage>>;
}

/// Check that a table name can be spliced into SQL text safely
pub fn validate_table_name(name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        },
        None => false,
    };

    if valid && name.len() <= 63 {
        Ok(())
    } else {
        Err(StoreError::InvalidTableName(name.to_string()))
    }
}
