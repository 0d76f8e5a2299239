//! Reactor Status Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging setup, and error handling for the reactor status
//! workspace.
//!
//! # Overview
//!
//! - **Types**: [`StatusRecord`] and the [`PowerStatus`] classification
//! - **Errors**: per-record conversion errors ([`RecordError`])
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```
//! use reactor_common::{PowerStatus, StatusRecord};
//!
//! let record = StatusRecord::from_source_fields("01/02/2024 08:00:00 AM", "UnitA", "75")?;
//! assert_eq!(record.normalized_timestamp(), "2024-01-02 08:00:00");
//! assert_eq!(PowerStatus::from_power(record.power), Some(PowerStatus::Running));
//! # Ok::<(), reactor_common::RecordError>(())
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{RecordError, Result};
pub use types::{PowerStatus, StatusRecord, UnitOutage};
