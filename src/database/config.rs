//! Migrator configuration structures and validation
//!
//! This module handles the configuration the migration engine needs:
//! the database connection URL, the directory holding migration files,
//! and the name of the tracking table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Configuration for the migration engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigratorConfig {
    /// Database connection URL (required)
    pub url: String,

    /// Directory containing migration files
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,

    /// Name of the single-row tracking table
    #[serde(default = "default_tracking_table")]
    pub tracking_table: String,
}

impl MigratorConfig {
    /// Create a configuration with default directory and table name
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            migrations_dir: default_migrations_dir(),
            tracking_table: default_tracking_table(),
        }
    }

    /// Validate the configuration
    ///
    /// The tracking table name is interpolated into SQL and must be a bare
    /// identifier; anything else is rejected here rather than at the driver.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::config("Database URL is required"));
        }
        if !is_valid_identifier(&self.tracking_table) {
            return Err(Error::config(format!(
                "Invalid tracking table name: '{}' (expected a bare SQL identifier)",
                self.tracking_table
            )));
        }
        Ok(())
    }
}

/// Check that a name is a bare SQL identifier: leading letter or
/// underscore, then letters, digits, or underscores.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Default values for configuration
fn default_migrations_dir() -> PathBuf {
    PathBuf::from("./migrations")
}
fn default_tracking_table() -> String {
    "sqldrift_schema".to_string()
}

/// Builder for MigratorConfig
pub struct MigratorConfigBuilder {
    url: Option<String>,
    migrations_dir: PathBuf,
    tracking_table: String,
}

impl MigratorConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            url: None,
            migrations_dir: default_migrations_dir(),
            tracking_table: default_tracking_table(),
        }
    }

    /// Set the database URL (required)
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the migrations directory
    pub fn migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set the tracking table name
    pub fn tracking_table(mut self, table: impl Into<String>) -> Self {
        self.tracking_table = table.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<MigratorConfig> {
        let url = self.url.ok_or_else(|| Error::config("Database URL is required"))?;

        let config = MigratorConfig {
            url,
            migrations_dir: self.migrations_dir,
            tracking_table: self.tracking_table,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for MigratorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
