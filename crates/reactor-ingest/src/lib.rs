//! Reactor Status Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads the published power reactor status feed into a relational store
//! and answers status and outage questions against it.
//!
//! # Components
//!
//! - **Source**: one blocking-style HTTP fetch of the pipe-delimited feed
//! - **Parser**: header validation and per-row conversion to [`StatusRecord`]
//! - **Store**: the [`StatusStore`] trait with PostgreSQL and in-memory backends
//! - **Pipeline**: drop, fetch, recreate, parse and bulk insert
//! - **Query**: unit listing, reactor detail, outages by date range
//!
//! # Example
//!
//! ```no_run
//! use reactor_ingest::{IngestPipeline, MemoryStatusStore, SourceClient, DEFAULT_SOURCE_URL};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStatusStore::new());
//!     let client = SourceClient::new(Duration::from_secs(60))?;
//!     let pipeline = IngestPipeline::new(store, client, DEFAULT_SOURCE_URL);
//!
//!     let outcome = pipeline.run().await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! [`StatusRecord`]: reactor_common::StatusRecord

pub mod error;
pub mod parser;
pub mod pipeline;
pub mod query;
pub mod source;
pub mod store;

pub use error::{IngestError, Result};
pub use parser::{FeedParser, ParsedFeed, SkippedRow, EXPECTED_HEADER};
pub use pipeline::{IngestOutcome, IngestPipeline, IngestStats};
pub use query::{ReactorDetail, ReactorQueries};
pub use source::{SourceClient, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_SOURCE_URL};
pub use store::{
    create_pool, DbConfig, MemoryStatusStore, PgStatusStore, StatusStore, StoreError, StoreResult,
};
