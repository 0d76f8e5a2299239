//! Domain types shared across the workspace

use crate::error::{RecordError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Timestamp Formats
// ============================================================================

/// Timestamp layout used by the published feed (`01/02/2024 08:00:00 AM`).
pub const SOURCE_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Normalized timestamp layout (`2024-01-02 08:00:00`).
pub const NORMALIZED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Calendar date layout shown in prompts (`01/02/2024`).
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Calendar date layout used in reports (`2024-01-02`).
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Power level at or above which a unit counts as fully running.
pub const RUNNING_THRESHOLD: i32 = 50;

// ============================================================================
// Status Record
// ============================================================================

/// One reported observation of a unit's power output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusRecord {
    /// When the observation was reported (second precision)
    pub report_dt: NaiveDateTime,

    /// Reactor unit identifier, kept verbatim from the feed
    pub unit: String,

    /// Reported power output in percent. Not range-checked.
    pub power: i32,
}

impl StatusRecord {
    pub fn new(report_dt: NaiveDateTime, unit: impl Into<String>, power: i32) -> Self {
        Self {
            report_dt,
            unit: unit.into(),
            power,
        }
    }

    /// Convert the three raw feed fields into a record.
    ///
    /// The unit is taken as-is; the power field tolerates surrounding
    /// whitespace.
    pub fn from_source_fields(timestamp: &str, unit: &str, power: &str) -> Result<Self> {
        let report_dt = parse_source_timestamp(timestamp)?;
        let power = power
            .trim()
            .parse::<i32>()
            .map_err(|source| RecordError::Power {
                value: power.to_string(),
                source,
            })?;

        Ok(Self::new(report_dt, unit, power))
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS`
    pub fn normalized_timestamp(&self) -> String {
        self.report_dt.format(NORMALIZED_TIMESTAMP_FORMAT).to_string()
    }

    /// Calendar day of the report
    pub fn report_date(&self) -> NaiveDate {
        self.report_dt.date()
    }

    /// Whether this observation counts as an outage
    pub fn is_outage(&self) -> bool {
        self.power == 0
    }
}

/// Parse a feed timestamp such as `1/2/2024 12:00:00 AM`
pub fn parse_source_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), SOURCE_TIMESTAMP_FORMAT).map_err(|source| {
        RecordError::Timestamp {
            value: value.to_string(),
            source,
        }
    })
}

// ============================================================================
// Power Classification
// ============================================================================

/// Operating state derived from a unit's latest power level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerStatus {
    /// Reported at exactly 0%
    Down,
    /// Reported between 1% and 49%
    LowPower,
    /// Reported at 50% or more
    Running,
}

impl PowerStatus {
    /// Classify a power level. Negative levels have no classification.
    pub fn from_power(power: i32) -> Option<Self> {
        match power {
            0 => Some(PowerStatus::Down),
            1..RUNNING_THRESHOLD => Some(PowerStatus::LowPower),
            p if p >= RUNNING_THRESHOLD => Some(PowerStatus::Running),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerStatus::Down => "down",
            PowerStatus::LowPower => "running low power",
            PowerStatus::Running => "running",
        }
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Outage Summary
// ============================================================================

/// Number of zero-power reports for one unit within a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOutage {
    pub unit: String,
    pub days_down: i64,
}
