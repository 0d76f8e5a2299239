//! In-process status store
//!
//! Same semantics as the PostgreSQL store, including the absent-table state
//! between a drop and the next create. Used for tests and dry runs.

use super::{StatusStore, StoreError, StoreResult, DEFAULT_TABLE_NAME};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reactor_common::{StatusRecord, UnitOutage};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

/// Status store backed by a vector
#[derive(Debug)]
pub struct MemoryStatusStore {
    // None while the table is dropped
    table: Mutex<Option<Vec<StatusRecord>>>,
}

impl MemoryStatusStore {
    /// Create a store with an empty, existing table
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Some(Vec::new())),
        }
    }

    /// Create a store already holding `records`
    pub fn with_records(records: Vec<StatusRecord>) -> Self {
        Self {
            table: Mutex::new(Some(records)),
        }
    }

    /// Copy of every stored row, in insertion order
    pub async fn snapshot(&self) -> StoreResult<Vec<StatusRecord>> {
        let table = self.table.lock().await;
        table.clone().ok_or_else(missing_table)
    }

    /// Whether the table currently exists
    pub async fn table_exists(&self) -> bool {
        self.table.lock().await.is_some()
    }

    async fn read<T>(&self, f: impl FnOnce(&[StatusRecord]) -> T) -> StoreResult<T> {
        let table = self.table.lock().await;
        table.as_deref().map(f).ok_or_else(missing_table)
    }
}

impl Default for MemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_table() -> StoreError {
    StoreError::MissingTable(DEFAULT_TABLE_NAME.to_string())
}

fn outages_of<'a>(rows: &'a [StatusRecord], unit: &'a str) -> impl Iterator<Item = &'a StatusRecord> {
    rows.iter().filter(move |r| r.unit == unit && r.is_outage())
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn drop_table(&self) -> StoreResult<()> {
        *self.table.lock().await = None;
        Ok(())
    }

    async fn create_table(&self) -> StoreResult<()> {
        let mut table = self.table.lock().await;
        if table.is_none() {
            *table = Some(Vec::new());
        }
        Ok(())
    }

    async fn bulk_insert(&self, records: &[StatusRecord]) -> StoreResult<u64> {
        if records.is_empty() {
            return Err(StoreError::EmptyInsert);
        }

        let mut table = self.table.lock().await;
        let rows = table.as_mut().ok_or_else(missing_table)?;
        rows.extend_from_slice(records);

        Ok(records.len() as u64)
    }

    async fn list_units(&self) -> StoreResult<Vec<String>> {
        self.read(|rows| {
            rows.iter()
                .map(|r| r.unit.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
        .await
    }

    async fn unit_exists(&self, unit: &str) -> StoreResult<bool> {
        self.read(|rows| rows.iter().any(|r| r.unit == unit)).await
    }

    async fn latest_status(
        &self,
        unit: &str,
        as_of: NaiveDateTime,
    ) -> StoreResult<Option<StatusRecord>> {
        self.read(|rows| {
            rows.iter()
                .filter(|r| r.unit == unit && r.report_dt <= as_of)
                .max_by_key(|r| r.report_dt)
                .cloned()
        })
        .await
    }

    async fn outage_count(&self, unit: &str) -> StoreResult<i64> {
        self.read(|rows| outages_of(rows, unit).count() as i64).await
    }

    async fn last_outage(&self, unit: &str) -> StoreResult<Option<NaiveDateTime>> {
        self.read(|rows| outages_of(rows, unit).map(|r| r.report_dt).max())
            .await
    }

    async fn date_bounds(&self) -> StoreResult<Option<(NaiveDateTime, NaiveDateTime)>> {
        self.read(|rows| {
            let min = rows.iter().map(|r| r.report_dt).min()?;
            let max = rows.iter().map(|r| r.report_dt).max()?;
            Some((min, max))
        })
        .await
    }

    async fn outages_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<UnitOutage>> {
        self.read(|rows| {
            let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
            for row in rows.iter().filter(|r| {
                let day = r.report_date();
                r.is_outage() && start <= day && day <= end
            }) {
                *counts.entry(row.unit.as_str()).or_default() += 1;
            }

            counts
                .into_iter()
                .map(|(unit, days_down)| UnitOutage {
                    unit: unit.to_string(),
                    days_down,
                })
                .collect()
        })
        .await
    }
}
