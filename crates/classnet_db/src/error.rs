//! Errors raised by the device registry storage

use classnet_common::ClassnetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    SqlxError(#[from] sqlx::Error),

    /// The `[database]` section is missing or unusable.
    #[error("database is not configured: {0}")]
    ConfigError(String),

    #[error("invalid database url: {0}")]
    UrlError(String),

    /// The pool or the sqlite file could not be opened.
    #[error("could not open database: {0}")]
    PoolError(String),

    #[error("registry query failed: {0}")]
    QueryError(String),

    /// A stored row does not fit the device model.
    #[error("malformed device row: {0}")]
    DecodeError(String),

    #[error("device registry lock poisoned")]
    Poisoned,
}

impl From<DbError> for ClassnetError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConfigError(msg) | DbError::UrlError(msg) => ClassnetError::ConfigError(msg),
            other => ClassnetError::DatabaseError(other.to_string()),
        }
    }
}
