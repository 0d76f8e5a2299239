//! Ingest pipeline
//!
//! Replaces the whole dataset from the remote feed:
//!
//! 1. Drop the status table
//! 2. Fetch the feed (fatal on failure)
//! 3. Recreate the table
//! 4. Parse and validate the header (fatal on mismatch)
//! 5. Bulk insert the valid rows, or report that there were none
//!
//! There is no rollback. A failure after step 1 can leave the table absent
//! or empty until the next successful run.

use crate::error::Result;
use crate::parser::FeedParser;
use crate::source::SourceClient;
use crate::store::StatusStore;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// Counters for one ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Size of the downloaded feed in bytes
    pub fetched_bytes: usize,
    /// Rows that converted into records
    pub parsed: usize,
    /// Rows dropped with a diagnostic
    pub skipped: usize,
    /// Rows written to the store
    pub inserted: u64,
}

/// How an ingest run that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Records were written
    Loaded(IngestStats),
    /// The feed held no valid rows; the table was left empty
    NoValidRows(IngestStats),
}

/// Drop, fetch, recreate, parse, insert
pub struct IngestPipeline {
    store: Arc<dyn StatusStore>,
    client: SourceClient,
    parser: FeedParser,
    source_url: String,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn StatusStore>,
        client: SourceClient,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            client,
            parser: FeedParser::new(),
            source_url: source_url.into(),
        }
    }

    /// Run one full ingest cycle
    pub async fn run(&self) -> Result<IngestOutcome> {
        let span = info_span!("ingest", url = %self.source_url);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<IngestOutcome> {
        self.store.drop_table().await?;

        let body = self.client.fetch(&self.source_url).await?;

        self.store.create_table().await?;

        let feed = self.parser.parse(&body)?;

        let mut stats = IngestStats {
            fetched_bytes: body.len(),
            parsed: feed.records.len(),
            skipped: feed.skipped.len(),
            inserted: 0,
        };

        if feed.records.is_empty() {
            info!(skipped = stats.skipped, "No valid rows to insert");
            return Ok(IngestOutcome::NoValidRows(stats));
        }

        stats.inserted = self.store.bulk_insert(&feed.records).await?;

        info!(
            inserted = stats.inserted,
            skipped = stats.skipped,
            "Dataset refreshed"
        );

        Ok(IngestOutcome::Loaded(stats))
    }
}
