//! Error types and utilities for the Zettel bot

use thiserror::Error;

/// Result type alias for Zettel operations
pub type Result<T> = std::result::Result<T, ZettelError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for Zettel operations
#[derive(Error, Debug)]
pub enum ZettelError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (HTTP requests, etc.)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Telegram Bot API answered with `ok: false`
    #[error("Telegram API error: {message}")]
    Telegram {
        message: String,
        error_code: Option<i64>,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Database related errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Graph layout and rendering errors
    #[error("Graph error: {message}")]
    Graph {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },
}

impl ZettelError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Telegram API error
    pub fn telegram(msg: impl Into<String>) -> Self {
        Self::Telegram {
            message: msg.into(),
            error_code: None,
            source: None,
        }
    }

    /// Create a new Telegram API error with the `error_code` Telegram reported
    pub fn telegram_with_code(msg: impl Into<String>, code: i64) -> Self {
        Self::Telegram {
            message: msg.into(),
            error_code: Some(code),
            source: None,
        }
    }

    /// Create a new database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new database error with source
    pub fn database_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Database {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Telegram error code, if this error came from the Bot API
    pub const fn telegram_code(&self) -> Option<i64> {
        match self {
            Self::Telegram { error_code, .. } => *error_code,
            _ => None,
        }
    }
}

// Error conversion implementations for external types

/// Convert from reqwest::Error to ZettelError
impl From<reqwest::Error> for ZettelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map_or(0, |s| s.as_u16());
            Self::network_with_source(format!("HTTP error: {status_code}"), err)
        } else if err.is_decode() {
            Self::network_with_source("Failed to decode response body", err)
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

/// Convert from sqlx::Error to ZettelError
impl From<sqlx::Error> for ZettelError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::database_with_source("Row not found", err),
            sqlx::Error::PoolTimedOut => {
                Self::database_with_source("Timed out waiting for a database connection", err)
            }
            other => Self::database_with_source("Database query failed", other),
        }
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to ZettelError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for ZettelError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Graph rendering failed", err)
    }
}
