//! SQLite persistence for metric snapshots

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;

use crate::metric::MetricRecord;

#[derive(Clone)]
pub struct MetricStore {
    pool: SqlitePool,
}

impl MetricStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and run migrations
    pub async fn connect(path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

        Self::migrate(&pool).await?;
        Ok(Self::new(pool))
    }

    /// In-memory database, used by tests and throwaway servers
    pub async fn in_memory() -> anyhow::Result<Self> {
        // Every connection to :memory: is a separate database, so pin the pool to one
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::migrate(&pool).await?;
        Ok(Self::new(pool))
    }

    async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
        tracing::debug!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
        Ok(())
    }

    /// All records, newest date first
    pub async fn list(&self) -> Result<Vec<MetricRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, MetricRow>(
            "SELECT id, org, date, data FROM metrics ORDER BY date DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MetricRecord::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<MetricRecord>, sqlx::Error> {
        let row = sqlx::query_as::<_, MetricRow>(
            "SELECT id, org, date, data FROM metrics WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MetricRecord::from))
    }

    /// Insert a snapshot unless one already exists for `(org, date)`
    ///
    /// Returns `true` when a row was written.
    pub async fn insert_if_absent(
        &self,
        org: &str,
        date: &str,
        data: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO metrics (org, date, data) VALUES (?, ?, ?)
             ON CONFLICT(org, date) DO NOTHING",
        )
        .bind(org)
        .bind(date)
        .bind(data.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Store the GitHub metric days fetched for one org
    ///
    /// Days without a string `date` field are skipped. Returns the number of
    /// new rows.
    pub async fn store_org_metrics(
        &self,
        org: &str,
        days: &[serde_json::Value],
    ) -> Result<usize, sqlx::Error> {
        let mut inserted = 0;
        for day in days {
            let Some(date) = day.get("date").and_then(|d| d.as_str()) else {
                tracing::warn!(org = %org, "Skipping metric day without a date");
                continue;
            };
            if self.insert_if_absent(org, date, day).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM metrics")
            .fetch_one(&self.pool)
            .await?;
        row.try_get("total")
    }
}

#[derive(Debug)]
struct MetricRow {
    id: i64,
    org: String,
    date: String,
    data: String,
}

impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for MetricRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            org: row.try_get("org")?,
            date: row.try_get("date")?,
            data: row.try_get("data")?,
        })
    }
}

impl From<MetricRow> for MetricRecord {
    fn from(row: MetricRow) -> Self {
        let data = serde_json::from_str(&row.data)
            .unwrap_or(serde_json::Value::String(row.data));
        Self {
            id: row.id,
            org: row.org,
            date: row.date,
            data,
        }
    }
}
