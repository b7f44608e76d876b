//! Multi-backend database support module
//!
//! This module provides the driver contract the migration engine consumes
//! and its implementations for the supported backends, along with the
//! engine configuration.

pub mod config;
pub mod driver;
pub mod drivers;

// Re-export main types for convenience
pub use config::{is_valid_identifier, MigratorConfig, MigratorConfigBuilder};
pub use driver::{DatabaseBackend, Driver, TrackedState};
pub use drivers::{connect, MySqlDriver, PostgresDriver, SqliteDriver};
