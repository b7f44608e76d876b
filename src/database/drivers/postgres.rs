//! PostgreSQL database driver implementation

use crate::database::driver::{DatabaseBackend, Driver, TrackedState};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::sync::Arc;

/// PostgreSQL driver backed by a sqlx connection pool
#[derive(Clone)]
pub struct PostgresDriver {
    pool: Arc<PgPool>,
}

impl PostgresDriver {
    /// Connect to a PostgreSQL database
    ///
    /// The pool is capped at a single connection: migration steps are
    /// strictly sequential, so more would only hide ordering bugs.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| Error::connection(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Create a driver from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Get reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Driver for PostgresDriver {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        // Log SQL in development mode
        #[cfg(debug_assertions)]
        {
            log::debug!("Postgres EXECUTE: {}", sql);
        }

        // raw_sql runs the whole batch, statement separators included
        sqlx::raw_sql(sql)
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::execution(format!("PostgreSQL execute failed: {}", e)))?;

        Ok(())
    }

    async fn create_tracking_table(&self, table: &str) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    \
                id INTEGER PRIMARY KEY CHECK (id = 1),\n    \
                version BIGINT NOT NULL DEFAULT 0,\n    \
                dirty BOOLEAN NOT NULL DEFAULT FALSE,\n    \
                modified_at TIMESTAMPTZ NOT NULL DEFAULT NOW()\n\
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
                let id: i32 = row
                    .try_get("id")
                    .map_err(|e| Error::query(format!("Invalid tracking row id: {}", e)))?;
                let version: i64 = row
                    .try_get("version")
                    .map_err(|e| Error::query(format!("Invalid tracking row version: {}", e)))?;
                let dirty: bool = row
                    .try_get("dirty")
                    .map_err(|e| Error::query(format!("Invalid tracking row dirty flag: {}", e)))?;
                let modified_at: DateTime<Utc> = row
                    .try_get("modified_at")
                    .map_err(|e| Error::query(format!("Invalid tracking row timestamp: {}", e)))?;

                Ok(Some(TrackedState {
                    id: id as i64,
                    version,
                    dirty,
                    modified_at,
                }))
            }
            None => Ok(None),
        }
    }

    async fn write_state(&self, table: &str, version: i64, dirty: bool) -> Result<()> {
        let sql = format!(
            "INSERT INTO {table} (id, version, dirty, modified_at) \
             VALUES (1, $1, $2, NOW()) \
             ON CONFLICT (id) DO UPDATE SET \
                 version = EXCLUDED.version, \
                 dirty = EXCLUDED.dirty, \
                 modified_at = NOW()"
        );

        sqlx::query(&sql)
            .bind(version)
            .bind(dirty)
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
