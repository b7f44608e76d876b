//! sqldrift - a versioned SQL schema migration engine
//!
//! sqldrift applies ordered, reversible schema changes to a relational
//! database and durably records which changes have been applied in a
//! single tracking row, so re-running against the same database is safe
//! and idempotent. It provides:
//! - Up/down migration files with `-- migrate:up` / `-- migrate:down` markers
//! - A single-row version tracker with a dirty flag for crash detection
//! - Interchangeable database drivers (PostgreSQL, MySQL, SQLite)
//! - Structured status reporting with swappable renderers

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod error;

// Database module for multi-backend driver support
pub mod database;

// Migration engine: parser, tracker, runner, status reporting
pub mod migrations;

// Re-export main types for public API
pub use database::{connect, DatabaseBackend, Driver, MigratorConfig, TrackedState};
pub use error::{Error, Result};
pub use migrations::{
    Changeset, JsonRenderer, Parser, PlainRenderer, Runner, StatusEntry, StatusRenderer,
    StatusReport, Tracker,
};
