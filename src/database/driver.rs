//! Database driver trait for multi-backend support
//!
//! This module defines the narrow capability contract the migration engine
//! consumes: raw SQL execution plus the minimal CRUD on the single-row
//! tracking record. Each backend satisfies the same contract independently;
//! the engine never branches on backend identity.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    /// Human-readable backend name
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::MySql => "mysql",
            DatabaseBackend::Sqlite => "sqlite",
        }
    }
}

/// The persisted migration state: the single row of truth in the target
/// database. `id` is always 1; at most one logical row exists.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedState {
    pub id: i64,
    /// Highest changeset version considered successfully applied
    pub version: i64,
    /// True exactly while a changeset's SQL is executing and the outcome
    /// is not yet confirmed
    pub dirty: bool,
    pub modified_at: DateTime<Utc>,
}

/// Unified database driver trait
///
/// This trait provides a common interface for all database backends,
/// enabling the migration engine to work with PostgreSQL, MySQL, and
/// SQLite through the same API.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Get the database backend type
    fn backend(&self) -> DatabaseBackend;

    /// Execute raw SQL, possibly containing multiple statements
    ///
    /// # Arguments
    /// * `sql` - The SQL to execute as a batch
    ///
    /// # Returns
    /// * `Ok(())` - All statements executed
    /// * `Err(Error)` - Execution failed; the batch may have partially applied
    async fn execute(&self, sql: &str) -> Result<()>;

    /// Create the tracking table if it does not exist
    ///
    /// Must be safe to call repeatedly.
    async fn create_tracking_table(&self, table: &str) -> Result<()>;

    /// Read the tracking row
    ///
    /// # Returns
    /// * `Ok(Some(state))` - The tracking row
    /// * `Ok(None)` - No row has been written yet
    /// * `Err(Error)` - The query failed or the row could not be decoded
    async fn read_state(&self, table: &str) -> Result<Option<TrackedState>>;

    /// Upsert the tracking row with the given version and dirty flag,
    /// stamping `modified_at` with the current time
    async fn write_state(&self, table: &str, version: i64, dirty: bool) -> Result<()>;

    /// Release any resources held; idempotent
    async fn close(&self) -> Result<()>;
}
