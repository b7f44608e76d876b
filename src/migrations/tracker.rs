//! Version tracker over the driver capability
//!
//! A thin, stateless-between-calls wrapper around a [`Driver`] and a
//! configured tracking table name. Nothing is cached: every read goes
//! back to the database, so the tracker always reflects what the store
//! currently says.

use std::sync::Arc;

use crate::database::config::is_valid_identifier;
use crate::database::driver::{Driver, TrackedState};
use crate::error::{Error, Result};

/// Tracks the current schema version in the target database
#[derive(Clone)]
pub struct Tracker {
    driver: Arc<dyn Driver>,
    table: String,
}

impl Tracker {
    /// Create a tracker for the given driver and tracking table
    ///
    /// The table name is interpolated into SQL by the drivers and must be
    /// a bare identifier.
    pub fn new(driver: Arc<dyn Driver>, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        if !is_valid_identifier(&table) {
            return Err(Error::config(format!(
                "Invalid tracking table name: '{}'",
                table
            )));
        }
        Ok(Self { driver, table })
    }

    /// Get the tracking table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Ensure the tracking table exists; safe to call repeatedly
    pub async fn setup(&self) -> Result<()> {
        self.driver.create_tracking_table(&self.table).await
    }

    /// Get the current schema version, or 0 if no row exists yet
    pub async fn version(&self) -> Result<i64> {
        Ok(self
            .driver
            .read_state(&self.table)
            .await?
            .map(|s| s.version)
            .unwrap_or(0))
    }

    /// Check whether the schema is in a dirty state; false if no row
    /// exists yet
    pub async fn is_dirty(&self) -> Result<bool> {
        Ok(self
            .driver
            .read_state(&self.table)
            .await?
            .map(|s| s.dirty)
            .unwrap_or(false))
    }

    /// Read the full tracking row, if any
    pub async fn state(&self) -> Result<Option<TrackedState>> {
        self.driver.read_state(&self.table).await
    }

    /// Upsert the tracking row's version and dirty flag, stamping
    /// `modified_at` with the current time
    pub async fn set_version(&self, version: i64, dirty: bool) -> Result<()> {
        self.driver.write_state(&self.table, version, dirty).await
    }
}
