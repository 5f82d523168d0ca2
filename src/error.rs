// src/error.rs

//! Unified error handling for the exporter.

use std::fmt;

use thiserror::Error;

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failed (connection refused, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("GET {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Route cannot be exported
    #[error("Invalid route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },

    /// Two routes of one locale resolve to the same or overlapping output paths
    #[error("Routes '{first}' and '{second}' export to conflicting paths for locale {locale}")]
    OutputCollision {
        locale: String,
        first: String,
        second: String,
    },

    /// Base path configured but no reference was rewritten
    #[error("No base-path reference rewritten in {route} ({locale})")]
    RewriteMismatch { locale: String, route: String },

    /// Dynamic server could not be started or reached
    #[error("Server error: {0}")]
    Server(String),

    /// Blocking task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid-route error.
    pub fn invalid_route(route: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidRoute {
            route: route.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a server lifecycle error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }
}
