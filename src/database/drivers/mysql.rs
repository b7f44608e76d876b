//! MySQL database driver implementation

use crate::database::driver::{DatabaseBackend, Driver, TrackedState};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySqlPool, Row};
use std::sync::Arc;

/// MySQL driver backed by a sqlx connection pool
#[derive(Clone)]
pub struct MySqlDriver {
    pool: Arc<MySqlPool>,
}

impl MySqlDriver {
    /// Connect to a MySQL database
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| Error::connection(format!("Failed to connect to MySQL: {}", e)))?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Create a driver from an existing pool
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Get reference to the underlying pool
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl Driver for MySqlDriver {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySql
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        // Log SQL in development mode
        #[cfg(debug_assertions)]
        {
            log::debug!("MySQL EXECUTE: {}", sql);
        }

        sqlx::raw_sql(sql)
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::execution(format!("MySQL execute failed: {}", e)))?;

        Ok(())
    }

    async fn create_tracking_table(&self, table: &str) -> Result<()> {
        // MySQL historically ignores CHECK constraints, so the single-row
        // invariant rests on the fixed primary key alone.
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    \
                id INT PRIMARY KEY,\n    \
                version BIGINT NOT NULL DEFAULT 0,\n    \
                dirty BOOLEAN NOT NULL DEFAULT FALSE,\n    \
                modified_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP\n\
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
             VALUES (1, ?, ?, UTC_TIMESTAMP()) \
             ON DUPLICATE KEY UPDATE \
                 version = VALUES(version), \
                 dirty = VALUES(dirty), \
                 modified_at = UTC_TIMESTAMP()"
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
