//! Core error types for taskweave-core.
//!
//! Fatal errors (setup, persistence, failure to read a run's inputs) are
//! surfaced as [`CoreError`]. Per-item failures inside a flow are logged and
//! counted instead of being returned.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for taskweave-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// State snapshot errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Task store or calendar store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while persisting the task/event mapping.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to write state to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// No usable data directory
    #[error("Cannot determine data directory: {0}")]
    DataDir(String),
}

/// Credential errors. Always fatal to the flows that need the stores.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No token found in any configured source
    #[error("Credentials not configured for {service}; set {env_var} or run `taskweave auth set-token`")]
    CredentialsNotConfigured { service: String, env_var: String },

    /// OS keyring failure
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Errors returned by the task store and calendar store adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the remote API
    #[error("{service} API returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The response did not have the expected shape
    #[error("Malformed {service} response: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },

    /// Credentials could not be obtained for the request
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Error reported by a non-HTTP store implementation
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn malformed(service: &'static str, message: impl Into<String>) -> Self {
        StoreError::Malformed {
            service,
            message: message.into(),
        }
    }
}

/// Errors from the analysis capability. Callers degrade to defaults.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unparseable analysis output: {0}")]
    Unparseable(String),

    #[error("Analysis is disabled")]
    Disabled,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
