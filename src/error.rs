//! Error types for nutrisage
//!
//! This module defines all error types used throughout the service,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for nutrisage operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, provider interactions, tool execution,
/// Telegram calls, and meal-log persistence.
#[derive(Error, Debug)]
pub enum NutrisageError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (model API calls, authentication, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    Tool(String),

    /// Telegram API errors (webhook registration, outbound sends)
    #[error("Telegram error: {0}")]
    Telegram(String),

    /// Nutrition lookup errors
    #[error("Nutrition lookup error: {0}")]
    Nutrition(String),

    /// Meal log persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Agent exceeded maximum turn limit
    #[error("Agent exceeded maximum turns: limit={limit}, {message}")]
    MaxTurnsExceeded {
        /// The configured turn limit
        limit: usize,
        /// Additional context about the failure
        message: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for nutrisage operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
