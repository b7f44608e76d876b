//! Changeset data model
//!
//! A changeset is one migration unit: forward (up) and reverse (down) SQL
//! plus an identifier carrying the version number. Changesets are
//! immutable and rebuilt fresh from the migration directory on every
//! invocation.

use std::path::PathBuf;

/// One migration unit, parsed from a `.sql` file
#[derive(Debug, Clone, PartialEq)]
pub struct Changeset {
    /// The changeset identifier, conventionally `<digits>_<description>`
    /// (e.g. "001_create_users")
    pub id: String,

    /// The SQL to execute when migrating up
    pub up_sql: String,

    /// The SQL to execute when rolling back
    pub down_sql: String,

    /// The originating file path, informational only
    pub source_path: PathBuf,
}

impl Changeset {
    pub fn new(
        id: impl Into<String>,
        up_sql: impl Into<String>,
        down_sql: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            up_sql: up_sql.into(),
            down_sql: down_sql.into(),
            source_path: source_path.into(),
        }
    }

    /// Extract the numeric version from the id: the component before the
    /// first `_`, parsed as an integer (e.g. 1 from "001_create_users").
    /// Returns `None` when that component is not numeric.
    pub fn version(&self) -> Option<i64> {
        self.id.split('_').next().and_then(|v| v.parse().ok())
    }
}
