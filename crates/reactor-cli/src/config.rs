//! Configuration management
//!
//! Settings come from `REACTOR_*` environment variables, optionally loaded
//! from a `.env` file, with a default for each one.

use crate::error::{CliError, Result};
use reactor_ingest::store::postgres::{
    DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_DB_HOST, DEFAULT_DB_NAME, DEFAULT_DB_PORT,
    DEFAULT_DB_USER,
};
use reactor_ingest::store::{validate_table_name, DEFAULT_TABLE_NAME};
use reactor_ingest::{DbConfig, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_SOURCE_URL};
use std::str::FromStr;

// ============================================================================
// Environment Variables
// ============================================================================

pub const ENV_DB_HOST: &str = "REACTOR_DB_HOST";
pub const ENV_DB_PORT: &str = "REACTOR_DB_PORT";
pub const ENV_DB_USER: &str = "REACTOR_DB_USER";
pub const ENV_DB_PASSWORD: &str = "REACTOR_DB_PASSWORD";
pub const ENV_DB_NAME: &str = "REACTOR_DB_NAME";
pub const ENV_SOURCE_URL: &str = "REACTOR_SOURCE_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "REACTOR_HTTP_TIMEOUT_SECS";
pub const ENV_TABLE: &str = "REACTOR_TABLE";

/// Program configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database connection settings
    pub database: DbConfig,

    /// Feed location
    pub source_url: String,

    /// Timeout for the feed download
    pub http_timeout_secs: u64,

    /// Status table name
    pub table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DbConfig::default(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            http_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            table: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a `.env` file (if any), the environment and
    /// defaults. Values that are present but malformed are errors.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            database: DbConfig {
                host: env_or(ENV_DB_HOST, DEFAULT_DB_HOST),
                port: parse_env(ENV_DB_PORT, DEFAULT_DB_PORT)?,
                user: env_or(ENV_DB_USER, DEFAULT_DB_USER),
                password: env_or(ENV_DB_PASSWORD, ""),
                database: env_or(ENV_DB_NAME, DEFAULT_DB_NAME),
                connect_timeout_secs: DEFAULT_DB_CONNECT_TIMEOUT_SECS,
            },
            source_url: env_or(ENV_SOURCE_URL, DEFAULT_SOURCE_URL),
            http_timeout_secs: parse_env(ENV_HTTP_TIMEOUT_SECS, DEFAULT_FETCH_TIMEOUT_SECS)?,
            table: env_or(ENV_TABLE, DEFAULT_TABLE_NAME),
        };

        Ok(config)
    }

    /// Replace the feed location
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.host.trim().is_empty() {
            return Err(CliError::config("Database host cannot be empty"));
        }

        if self.database.port == 0 {
            return Err(CliError::config("Database port must be greater than 0"));
        }

        if self.source_url.trim().is_empty() {
            return Err(CliError::config("Source URL cannot be empty"));
        }

        if self.http_timeout_secs == 0 {
            return Err(CliError::config("HTTP timeout must be greater than 0"));
        }

        validate_table_name(&self.table).map_err(|e| CliError::config(e.to_string()))?;

        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CliError::config(format!("{key}={raw:?} is not valid: {e}"))),
        Err(_) => Ok(default),
    }
}
