//! SQLite database driver implementation

use crate::database::driver::{DatabaseBackend, Driver, TrackedState};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// SQLite driver backed by a sqlx connection pool
#[derive(Clone)]
pub struct SqliteDriver {
    pool: Arc<SqlitePool>,
}

impl SqliteDriver {
    /// Connect to a SQLite database, creating the file if missing
    ///
    /// The pool is capped at a single connection: migration steps are
    /// strictly sequential, and `:memory:` databases exist per connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let options: SqliteConnectOptions = url
            .parse()
            .map_err(|e| Error::connection(format!("Invalid SQLite URL '{}': {}", url, e)))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.create_if_missing(true))
            .await
            .map_err(|e| Error::connection(format!("Failed to connect to SQLite: {}", e)))?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Create a driver from an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Get reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Driver for SqliteDriver {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        // Log SQL in development mode
        #[cfg(debug_assertions)]
        {
            log::debug!("SQLite EXECUTE: {}", sql);
        }

        sqlx::raw_sql(sql)
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::execution(format!("SQLite execute failed: {}", e)))?;

        Ok(())
    }

    async fn create_tracking_table(&self, table: &str) -> Result<()> {
        // SQLite has no timestamp type; modified_at is stored as RFC 3339 text
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    \
                id INTEGER PRIMARY KEY CHECK (id = 1),\n    \
                version INTEGER NOT NULL DEFAULT 0,\n    \
                dirty INTEGER NOT NULL DEFAULT 0,\n    \
                modified_at TEXT NOT NULL\n\
            )"
        );

        sqlx::query(&sql)
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::query(format!("Failed to create tracking table: {}", e)))?;

        Ok(())
    }

    async fn read_state(&self, table: &str) -> Result<Option<TrackedState>> {
        let sql = format!("SELECT id, version, dirty, modified_at FROM {table} WHERE id = 1");

        let row = sqlx::query(&sql)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::query(format!("Failed to read tracking row: {}", e)))?;

        match row {
            Some(row) => {
                let id: i64 = row
                    .try_get("id")
                    .map_err(|e| Error::query(format!("Invalid tracking row id: {}", e)))?;
                let version: i64 = row
                    .try_get("version")
                    .map_err(|e| Error::query(format!("Invalid tracking row version: {}", e)))?;
                let dirty: i64 = row
                    .try_get("dirty")
                    .map_err(|e| Error::query(format!("Invalid tracking row dirty flag: {}", e)))?;
                let modified_at: String = row
                    .try_get("modified_at")
                    .map_err(|e| Error::query(format!("Invalid tracking row timestamp: {}", e)))?;

                let modified_at = DateTime::parse_from_rfc3339(&modified_at)
                    .map_err(|e| Error::query(format!("Invalid modified_at format: {}", e)))?
                    .with_timezone(&Utc);

                Ok(Some(TrackedState {
                    id,
                    version,
                    dirty: dirty != 0,
                    modified_at,
                }))
            }
            None => Ok(None),
        }
    }

    async fn write_state(&self, table: &str, version: i64, dirty: bool) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let sql = format!(
            "INSERT OR REPLACE INTO {table} (id, version, dirty, modified_at) \
             VALUES (1, ?1, ?2, ?3)"
        );

        sqlx::query(&sql)
            .bind(version)
            .bind(dirty as i64)
            .bind(&now)
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::query(format!("Failed to write tracking row: {}", e)))?;

        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
