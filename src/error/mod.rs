use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sqldrift migration engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid migration format: {0}")]
    InvalidFormat(String),

    #[error("Missing '-- migrate:up' section in migration: {0}")]
    MissingUpSection(String),

    #[error("Migration file not found: {0}")]
    FileNotFound(String),

    #[error("Duplicate migration ID: {0}")]
    DuplicateMigration(String),

    #[error("Schema is dirty at version {version}; a previous run was interrupted and must be resolved manually")]
    DirtyState { version: i64 },

    // Database-specific errors
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("SQL execution error: {0}")]
    Execution(String),

    #[error("Database query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
