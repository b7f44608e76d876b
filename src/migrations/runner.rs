//! Migration runner
//!
//! Orchestrates parser, tracker, and driver to apply pending changesets
//! or roll back applied ones. The migration position is an explicit
//! two-state machine persisted in the tracking row: `CLEAN(v)` (last
//! completed version v, nothing in flight) and `DIRTY(v)` (a step
//! touching version v is in flight or was interrupted). Every operation
//! reads that state from the database before doing anything else.

use std::path::PathBuf;
use std::sync::Arc;

use crate::database::config::MigratorConfig;
use crate::database::driver::Driver;
use crate::database::drivers::connect;
use crate::error::{Error, Result};
use crate::migrations::changeset::Changeset;
use crate::migrations::parser::Parser;
use crate::migrations::report::{StatusEntry, StatusReport};
use crate::migrations::tracker::Tracker;

/// Runs migrations against a database
///
/// Execution is single-threaded and strictly sequential: one changeset at
/// a time, each driver call fully awaited before the next. If the process
/// dies while a changeset's SQL is executing, the tracking row is left
/// dirty and every subsequent `migrate`/`rollback` refuses to proceed
/// with [`Error::DirtyState`] until an operator reconciles the database
/// and clears the flag. The engine does not try to detect whether the
/// interrupted statement partially committed.
///
/// Multiple runner processes against the same database are NOT mutually
/// safe: the dirty-check-then-set sequence is not atomic across
/// processes, so concurrent invocations can race and corrupt the tracked
/// version. Serialize runs externally if that can happen.
pub struct Runner {
    driver: Arc<dyn Driver>,
    parser: Parser,
    tracker: Tracker,
    migrations_dir: PathBuf,
}

impl Runner {
    /// Create a runner over an already-connected driver
    pub fn new(
        driver: Arc<dyn Driver>,
        migrations_dir: impl Into<PathBuf>,
        tracking_table: impl Into<String>,
    ) -> Result<Self> {
        let tracker = Tracker::new(driver.clone(), tracking_table)?;
        Ok(Self {
            driver,
            parser: Parser::new(),
            tracker,
            migrations_dir: migrations_dir.into(),
        })
    }

    /// Connect and assemble a runner from configuration
    pub async fn from_config(config: &MigratorConfig) -> Result<Self> {
        config.validate()?;
        let driver = connect(&config.url).await?;
        Self::new(
            driver,
            config.migrations_dir.clone(),
            config.tracking_table.clone(),
        )
    }

    /// Get the tracker
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Ensure the tracking table exists
    pub async fn setup(&self) -> Result<()> {
        self.tracker.setup().await
    }

    /// Apply all pending changesets in ascending version order
    ///
    /// A changeset transitions the persisted state
    /// `CLEAN(prev) -> DIRTY(v) -> CLEAN(v)`; if its SQL fails the state
    /// halts at `DIRTY(v)`, the error propagates, and no further
    /// changesets are attempted. Changesets without a numeric version are
    /// never selected.
    ///
    /// # Returns
    /// The ids of the changesets applied, in order; empty when nothing
    /// was pending.
    pub async fn migrate(&self) -> Result<Vec<String>> {
        self.setup().await?;
        self.ensure_clean().await?;

        let changesets = self.parser.load_directory(&self.migrations_dir)?;
        let current = self.tracker.version().await?;

        let pending: Vec<&Changeset> = changesets
            .iter()
            .filter(|c| c.version().map_or(false, |v| v > current))
            .collect();

        if pending.is_empty() {
            log::info!("No pending migrations");
            return Ok(Vec::new());
        }

        log::info!("Running {} migration(s)", pending.len());

        let mut applied = Vec::with_capacity(pending.len());
        for changeset in pending {
            let version = changeset.version().ok_or_else(|| {
                Error::invalid_format(format!("Changeset {} has no version", changeset.id))
            })?;

            log::info!("Applying: {}", changeset.id);

            // Mark dirty before touching the schema
            self.tracker.set_version(version, true).await?;
            self.driver.execute(&changeset.up_sql).await?;
            self.tracker.set_version(version, false).await?;

            log::info!("Applied: {}", changeset.id);
            applied.push(changeset.id.clone());
        }

        Ok(applied)
    }

    /// Roll back the last `count` applied changesets, most recent first
    ///
    /// Each step transitions `DIRTY(v) -> CLEAN(v - 1)`: the tracked
    /// version moves down one changeset at a time rather than jumping to
    /// the target, so an interruption leaves an accurate floor. A
    /// changeset with no down SQL still steps the version down but skips
    /// the execute call.
    ///
    /// # Returns
    /// The ids of the changesets reverted, in order; empty when the
    /// tracked version is already 0.
    pub async fn rollback(&self, count: u32) -> Result<Vec<String>> {
        self.setup().await?;
        self.ensure_clean().await?;

        let current = self.tracker.version().await?;
        if current == 0 {
            log::info!("No migrations to roll back");
            return Ok(Vec::new());
        }

        let changesets = self.parser.load_directory(&self.migrations_dir)?;
        let floor = current - count as i64;

        let mut selected: Vec<&Changeset> = changesets
            .iter()
            .filter(|c| c.version().map_or(false, |v| v > floor && v <= current))
            .collect();
        // Most recently applied first; every selected changeset has a
        // version by construction
        selected.sort_by(|a, b| b.version().cmp(&a.version()));

        if selected.is_empty() {
            log::info!("No migrations to roll back");
            return Ok(Vec::new());
        }

        log::info!("Rolling back {} migration(s)", selected.len());

        let mut reverted = Vec::with_capacity(selected.len());
        for changeset in selected {
            let version = changeset.version().ok_or_else(|| {
                Error::invalid_format(format!("Changeset {} has no version", changeset.id))
            })?;

            log::info!("Reverting: {}", changeset.id);

            self.tracker.set_version(version, true).await?;
            if changeset.down_sql.is_empty() {
                log::warn!(
                    "Changeset {} has no down SQL; stepping version down without executing",
                    changeset.id
                );
            } else {
                self.driver.execute(&changeset.down_sql).await?;
            }
            self.tracker.set_version(version - 1, false).await?;

            log::info!("Reverted: {}", changeset.id);
            reverted.push(changeset.id.clone());
        }

        Ok(reverted)
    }

    /// Report the current migration position without mutating anything
    ///
    /// Entries preserve execution order; a changeset counts as applied
    /// when its version is at or below the tracked version. Unversioned
    /// changesets are listed but always pending, since neither `migrate`
    /// nor `rollback` will ever select them.
    pub async fn status(&self) -> Result<StatusReport> {
        self.setup().await?;

        let changesets = self.parser.load_directory(&self.migrations_dir)?;
        let current = self.tracker.version().await?;
        let dirty = self.tracker.is_dirty().await?;

        let entries = changesets
            .iter()
            .map(|c| {
                let version = c.version();
                StatusEntry {
                    id: c.id.clone(),
                    version,
                    applied: version.map_or(false, |v| v <= current),
                }
            })
            .collect();

        Ok(StatusReport {
            current_version: current,
            dirty,
            entries,
        })
    }

    /// Release the underlying driver's resources
    pub async fn close(&self) -> Result<()> {
        self.driver.close().await
    }

    /// Refuse to proceed when a previous run left the schema dirty
    async fn ensure_clean(&self) -> Result<()> {
        if self.tracker.is_dirty().await? {
            let version = self.tracker.version().await?;
            return Err(Error::DirtyState { version });
        }
        Ok(())
    }
}
