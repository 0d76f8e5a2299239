//! Reactor Status CLI - Main entry point

use clap::Parser;
use reactor_cli::{Cli, Config, Shell};
use reactor_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use reactor_ingest::{
    create_pool, IngestPipeline, PgStatusStore, ReactorQueries, SourceClient, StatusStore,
};
use std::io;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Console logs go to stderr; the menu owns stdout
    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        })
        .output(LogOutput::Console)
        .log_file_prefix("reactor-status")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The program works without logging
    let _log_guard = init_logging(&log_config).ok().flatten();

    if let Err(e) = run(cli).await {
        error!(error = %e, "Program stopped");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> reactor_cli::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(url) = cli.source_url {
        config = config.with_source_url(url);
    }
    config.validate()?;

    let pool = create_pool(&config.database).await?;
    let store: Arc<dyn StatusStore> = Arc::new(PgStatusStore::with_table(pool, &config.table)?);

    let client = SourceClient::new(Duration::from_secs(config.http_timeout_secs))?;
    let pipeline = IngestPipeline::new(store.clone(), client, config.source_url.clone());
    let queries = ReactorQueries::new(store);

    let mut shell = Shell::new(pipeline, queries, io::stdin().lock(), io::stdout().lock());

    if cli.skip_ingest {
        info!("Skipping startup refresh");
    } else {
        shell.refresh().await?;
    }

    shell.run().await
}
