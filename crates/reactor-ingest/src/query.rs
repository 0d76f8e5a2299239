//! Read queries over the status dataset

use crate::store::{StatusStore, StoreResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use reactor_common::{PowerStatus, StatusRecord, UnitOutage};
use std::sync::Arc;
use tracing::debug;

/// Everything known about one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactorDetail {
    pub unit: String,
    /// Most recent report at or before the query time
    pub latest: Option<StatusRecord>,
    /// Zero-power reports over the whole dataset
    pub outage_count: i64,
    pub last_outage: Option<NaiveDateTime>,
}

impl ReactorDetail {
    /// Classification of the latest report, if there is one
    pub fn status(&self) -> Option<PowerStatus> {
        self.latest
            .as_ref()
            .and_then(|record| PowerStatus::from_power(record.power))
    }
}

/// Query service used by the shell
#[derive(Clone)]
pub struct ReactorQueries {
    store: Arc<dyn StatusStore>,
}

impl ReactorQueries {
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    /// Distinct unit identifiers
    pub async fn list_units(&self) -> StoreResult<Vec<String>> {
        self.store.list_units().await
    }

    /// Detail for `unit` as of `now`, or `None` when no row carries that
    /// identifier.
    pub async fn reactor_detail(
        &self,
        unit: &str,
        now: NaiveDateTime,
    ) -> StoreResult<Option<ReactorDetail>> {
        if !self.store.unit_exists(unit).await? {
            debug!(unit = %unit, "No records for unit");
            return Ok(None);
        }

        let latest = self.store.latest_status(unit, now).await?;
        let outage_count = self.store.outage_count(unit).await?;
        let last_outage = self.store.last_outage(unit).await?;

        Ok(Some(ReactorDetail {
            unit: unit.to_string(),
            latest,
            outage_count,
            last_outage,
        }))
    }

    /// Units with at least one zero-power report dated within
    /// `[start, end]`, with their counts
    pub async fn outages_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<UnitOutage>> {
        self.store.outages_between(start, end).await
    }

    /// First and last report dates in the dataset
    pub async fn available_dates(&self) -> StoreResult<Option<(NaiveDate, NaiveDate)>> {
        let bounds = self.store.date_bounds().await?;
        Ok(bounds.map(|(min, max)| (min.date(), max.date())))
    }

    /// First and last report years in the dataset
    pub async fn year_bounds(&self) -> StoreResult<Option<(i32, i32)>> {
        let dates = self.available_dates().await?;
        Ok(dates.map(|(min, max)| (min.year(), max.year())))
    }
}
