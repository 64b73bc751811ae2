//! # Error Types
//!
//! Crate-wide error handling using thiserror. Per-team warming failures never
//! surface here: they are folded into [`WarmResult`](crate::warming::WarmResult)
//! by the team warmer. What does surface are store failures, configuration
//! problems and infrastructure errors that abort a run.

use crate::messaging::QueueError;
use thiserror::Error;

/// Errors raised by the cache warming core
#[derive(Error, Debug)]
pub enum WarmerError {
    #[error("Database error: {operation}: {message}")]
    Database { operation: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Metrics error: {message}")]
    Metrics { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WarmerError {
    /// Create a database error
    pub fn database(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error for a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a metrics error
    pub fn metrics(message: impl Into<String>) -> Self {
        Self::Metrics {
            message: message.into(),
        }
    }

    /// Whether retrying the failed operation could plausibly succeed.
    ///
    /// Configuration and validation problems are deterministic and fail the
    /// same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Configuration { .. } | Self::Validation { .. })
    }
}

impl From<sqlx::Error> for WarmerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => WarmerError::database("query", "No rows found"),
            sqlx::Error::Database(db_err) => WarmerError::database("database", db_err.to_string()),
            sqlx::Error::PoolTimedOut => {
                WarmerError::database("pool", "Timed out acquiring a connection")
            }
            sqlx::Error::PoolClosed => WarmerError::database("pool", "Database pool is closed"),
            sqlx::Error::Configuration(config_err) => {
                WarmerError::configuration(format!("database: {config_err}"))
            }
            _ => WarmerError::database("connection", err.to_string()),
        }
    }
}

impl From<config::ConfigError> for WarmerError {
    fn from(err: config::ConfigError) -> Self {
        WarmerError::configuration(err.to_string())
    }
}

impl From<prometheus::Error> for WarmerError {
    fn from(err: prometheus::Error) -> Self {
        WarmerError::metrics(err.to_string())
    }
}

impl From<serde_json::Error> for WarmerError {
    fn from(err: serde_json::Error) -> Self {
        WarmerError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WarmerError>;
