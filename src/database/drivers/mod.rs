//! Driver implementations for the supported database backends

pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use mysql::MySqlDriver;
pub use postgres::PostgresDriver;
pub use sqlite::SqliteDriver;

use crate::database::driver::Driver;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Connect to a database, selecting the driver from the URL scheme
///
/// Recognizes `postgres://` (or `postgresql://`), `mysql://`, and
/// `sqlite:` URLs.
///
/// # Returns
/// * `Ok(driver)` - A connected driver for the matching backend
/// * `Err(Error)` - Unrecognized scheme or connection failure
pub async fn connect(url: &str) -> Result<Arc<dyn Driver>> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok(Arc::new(PostgresDriver::connect(url).await?))
    } else if url.starts_with("mysql://") {
        Ok(Arc::new(MySqlDriver::connect(url).await?))
    } else if url.starts_with("sqlite:") {
        Ok(Arc::new(SqliteDriver::connect(url).await?))
    } else {
        Err(Error::config(format!(
            "Unsupported database URL scheme: {}",
            url
        )))
    }
}
