use std::fmt;
use thiserror::Error;

/// The base error type for all classnet errors.
///
/// Feature crates define their own error enums and implement
/// `From<TheirError> for ClassnetError` so handlers can use `?`.
#[derive(Error, Debug)]
pub enum ClassnetError {
    /// No credential was presented
    #[error("Authentication required: {0}")]
    AuthMissing(String),

    /// A credential was presented but is wrong, expired or out of scope
    #[error("Access denied: {0}")]
    AuthInvalid(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ClassnetError {
    fn status_code(&self) -> u16 {
        match self {
            ClassnetError::AuthMissing(_) => 401,
            ClassnetError::AuthInvalid(_) => 403,
            ClassnetError::ValidationError(_) => 400,
            ClassnetError::ParseError(_) => 400,
            ClassnetError::NotFoundError(_) => 404,
            ClassnetError::ConfigError(_) => 500,
            ClassnetError::DatabaseError(_) => 500,
            ClassnetError::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for ClassnetError {
    fn from(err: serde_json::Error) -> Self {
        ClassnetError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for ClassnetError {
    fn from(err: std::io::Error) -> Self {
        ClassnetError::InternalError(err.to_string())
    }
}

// Shorthands used by the handlers.
pub fn auth_missing<T: fmt::Display>(message: T) -> ClassnetError {
    ClassnetError::AuthMissing(message.to_string())
}

pub fn auth_invalid<T: fmt::Display>(message: T) -> ClassnetError {
    ClassnetError::AuthInvalid(message.to_string())
}

pub fn config_error<T: fmt::Display>(message: T) -> ClassnetError {
    ClassnetError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> ClassnetError {
    ClassnetError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> ClassnetError {
    ClassnetError::NotFoundError(message.to_string())
}

pub fn database_error<T: fmt::Display>(message: T) -> ClassnetError {
    ClassnetError::DatabaseError(message.to_string())
}
