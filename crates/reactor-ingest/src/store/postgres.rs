//! PostgreSQL status store

use super::{validate_table_name, StatusStore, StoreError, StoreResult, DEFAULT_TABLE_NAME};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reactor_common::{StatusRecord, UnitOutage};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{debug, info};

// ============================================================================
// Connection Constants
// ============================================================================

/// Default database host.
pub const DEFAULT_DB_HOST: &str = "localhost";

/// Default database port.
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default database user.
pub const DEFAULT_DB_USER: &str = "postgres";

/// Default database name.
pub const DEFAULT_DB_NAME: &str = "postgres";

/// Default connection timeout in seconds.
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Rows per INSERT statement. Three bound parameters per row keeps each
/// statement well under the PostgreSQL limit of 65535 parameters.
pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 5_000;

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub connect_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            password: String::new(),
            database: DEFAULT_DB_NAME.to_string(),
            connect_timeout_secs: DEFAULT_DB_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl DbConfig {
    fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);

        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }
}

/// Open the single long-lived connection the program works through
pub async fn create_pool(config: &DbConfig) -> StoreResult<PgPool> {
    if config.host.is_empty() {
        return Err(StoreError::Config("database host cannot be empty".to_string()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(config.connect_options())
        .await?;

    info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        "Database connection established"
    );

    Ok(pool)
}

/// Status store over a PostgreSQL pool
pub struct PgStatusStore {
    pool: PgPool,
    table: String,
    insert_chunk_size: usize,
}

impl PgStatusStore {
    /// Create a store using the default table name
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table: DEFAULT_TABLE_NAME.to_string(),
            insert_chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
        }
    }

    /// Create a store over a custom table. The name is validated because it
    /// is the only part of any statement that cannot be bound.
    pub fn with_table(pool: PgPool, table: impl Into<String>) -> StoreResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;

        Ok(Self {
            pool,
            table,
            insert_chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
        })
    }

    pub fn with_insert_chunk_size(mut self, chunk_size: usize) -> Self {
        self.insert_chunk_size = chunk_size.max(1);
        self
    }
}

#[async_trait]
impl StatusStore for PgStatusStore {
    async fn drop_table(&self) -> StoreResult<()> {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", self.table))
            .execute(&self.pool)
            .await?;

        debug!(table = %self.table, "Dropped status table");
        Ok(())
    }

    async fn create_table(&self) -> StoreResult<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                "ReportDt" TIMESTAMP NOT NULL,
                "Unit" TEXT NOT NULL,
                "Power" INTEGER NOT NULL
            )
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await?;

        debug!(table = %self.table, "Created status table");
        Ok(())
    }

    async fn bulk_insert(&self, records: &[StatusRecord]) -> StoreResult<u64> {
        if records.is_empty() {
            return Err(StoreError::EmptyInsert);
        }

        let total_chunks = records.len().div_ceil(self.insert_chunk_size);
        let mut inserted = 0;

        // All chunks commit together
        let mut tx = self.pool.begin().await?;

        for (chunk_idx, chunk) in records.chunks(self.insert_chunk_size).enumerate() {
            debug!(
                "Inserting chunk {} / {} ({} rows)",
                chunk_idx + 1,
                total_chunks,
                chunk.len()
            );

            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                r#"INSERT INTO {} ("ReportDt", "Unit", "Power") "#,
                self.table
            ));

            query_builder.push_values(chunk, |mut b, record| {
                b.push_bind(record.report_dt)
                    .push_bind(&record.unit)
                    .push_bind(record.power);
            });

            let result = query_builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;

        info!(table = %self.table, rows = inserted, "Inserted status records");
        Ok(inserted)
    }

    async fn list_units(&self) -> StoreResult<Vec<String>> {
        let units = sqlx::query_scalar::<_, String>(&format!(
            r#"SELECT DISTINCT "Unit" FROM {} ORDER BY "Unit""#,
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(units)
    }

    async fn unit_exists(&self, unit: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(&format!(
            r#"SELECT EXISTS (SELECT 1 FROM {} WHERE "Unit" = $1)"#,
            self.table
        ))
        .bind(unit)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn latest_status(
        &self,
        unit: &str,
        as_of: NaiveDateTime,
    ) -> StoreResult<Option<StatusRecord>> {
        let row = sqlx::query_as::<_, (NaiveDateTime, String, i32)>(&format!(
            r#"
            SELECT "ReportDt", "Unit", "Power"
            FROM {}
            WHERE "Unit" = $1 AND "ReportDt" <= $2
            ORDER BY "ReportDt" DESC
            LIMIT 1
            "#,
            self.table
        ))
        .bind(unit)
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(report_dt, unit, power)| StatusRecord::new(report_dt, unit, power)))
    }

    async fn outage_count(&self, unit: &str) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            r#"SELECT COUNT(*) FROM {} WHERE "Unit" = $1 AND "Power" = 0"#,
            self.table
        ))
        .bind(unit)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn last_outage(&self, unit: &str) -> StoreResult<Option<NaiveDateTime>> {
        let last = sqlx::query_scalar::<_, Option<NaiveDateTime>>(&format!(
            r#"SELECT MAX("ReportDt") FROM {} WHERE "Unit" = $1 AND "Power" = 0"#,
            self.table
        ))
        .bind(unit)
        .fetch_one(&self.pool)
        .await?;

        Ok(last)
    }

    async fn date_bounds(&self) -> StoreResult<Option<(NaiveDateTime, NaiveDateTime)>> {
        let (min, max) =
            sqlx::query_as::<_, (Option<NaiveDateTime>, Option<NaiveDateTime>)>(&format!(
                r#"SELECT MIN("ReportDt"), MAX("ReportDt") FROM {}"#,
                self.table
            ))
            .fetch_one(&self.pool)
            .await?;

        Ok(min.zip(max))
    }

    async fn outages_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<UnitOutage>> {
        let rows = sqlx::query_as::<_, (String, i64)>(&format!(
            r#"
            SELECT "Unit", COUNT(*)
            FROM {}
            WHERE "Power" = 0
              AND CAST("ReportDt" AS DATE) BETWEEN $1 AND $2
            GROUP BY "Unit"
            ORDER BY "Unit"
            "#,
            self.table
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(unit, days_down)| UnitOutage { unit, days_down })
            .collect())
    }
}
