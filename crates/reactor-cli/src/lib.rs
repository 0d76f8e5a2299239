//! Reactor Status CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Interactive front end for the power reactor status dataset.
//!
//! # Overview
//!
//! On startup the program refreshes the dataset from the published feed and
//! then offers a menu:
//!
//! 1. List all of the reactor units
//! 2. Show status and outage history for one unit
//! 3. List units that were down within a date range
//! 4. Refresh the dataset
//! 5. Exit

pub mod config;
pub mod error;
pub mod shell;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};
pub use shell::{MenuChoice, Shell};

use clap::Parser;

/// Power reactor status browser
#[derive(Parser, Debug)]
#[command(name = "reactor-status")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Feed URL
    #[arg(long, env = "REACTOR_SOURCE_URL")]
    pub source_url: Option<String>,

    /// Start with the stored dataset instead of refreshing it
    #[arg(long)]
    pub skip_ingest: bool,
}
