//! Error handling for the songcat service
//!
//! Errors are split into client input errors (reported straight back to the
//! caller), storage/execution failures (logged, reported generically) and
//! configuration errors raised during startup.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SongCatalogError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot parse {field}: '{value}' (expected DD.MM.YYYY)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Operation '{operation}' exceeded its deadline")]
    Timeout { operation: &'static str },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SongCatalogError {
    /// True for errors caused by the caller's input rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SongCatalogError::InvalidDate { .. } | SongCatalogError::Validation(_)
        )
    }

    /// True when repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SongCatalogError::Timeout { .. }
                | SongCatalogError::Database(DatabaseError::Interrupted)
                | SongCatalogError::Database(DatabaseError::Busy)
        )
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(#[source] rusqlite::Error),

    #[error("Query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Transaction failed: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("Statement interrupted at deadline")]
    Interrupted,

    #[error("Database is busy")]
    Busy,

    #[error("Connection lock poisoned")]
    LockPoisoned,

    #[error("Database corruption detected")]
    Corruption,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid config format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to determine project directories")]
    NoProjectDirs,
}

pub type Result<T> = std::result::Result<T, SongCatalogError>;

use rusqlite::ffi;

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ffi::Error { code: ffi::ErrorCode::DatabaseCorrupt, .. }, _) => {
                DatabaseError::Corruption
            }
            rusqlite::Error::SqliteFailure(ffi::Error { code: ffi::ErrorCode::OperationInterrupted, .. }, _) => {
                DatabaseError::Interrupted
            }
            rusqlite::Error::SqliteFailure(
                ffi::Error { code: ffi::ErrorCode::DatabaseBusy | ffi::ErrorCode::DatabaseLocked, .. },
                _,
            ) => DatabaseError::Busy,
            _ => DatabaseError::Query(err),
        }
    }
}

impl From<rusqlite::Error> for SongCatalogError {
    fn from(err: rusqlite::Error) -> Self {
        SongCatalogError::Database(err.into())
    }
}

impl From<tokio::task::JoinError> for SongCatalogError {
    fn from(err: tokio::task::JoinError) -> Self {
        SongCatalogError::Internal(err.into())
    }
}
