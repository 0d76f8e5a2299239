//! HTTP client for the published reactor status feed

use crate::error::{IngestError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

// ============================================================================
// Source Constants
// ============================================================================

/// Power reactor status report covering the trailing 365 days.
pub const DEFAULT_SOURCE_URL: &str = "https://www.nrc.gov/reading-rm/doc-collections/event-status/reactor-status/powerreactorstatusforlast365days.txt";

/// Default timeout for the feed download in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 300;

/// Single-attempt text fetcher
pub struct SourceClient {
    client: Client,
}

impl SourceClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reactor-status/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Download `url` and return its body as text.
    ///
    /// Any non-success status is an [`IngestError::Fetch`]; there is no retry.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Requesting source feed");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(IngestError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        info!(url = %url, bytes = body.len(), "Fetched source feed");

        Ok(body)
    }
}
