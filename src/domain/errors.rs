// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration engine.
//!
//! Every fallible operation in the crate returns [`ConfigError`]. A record that is
//! absent from the persistent store is *not* an error: store reads return
//! `Ok(None)` and the engine treats that as an empty document.

use thiserror::Error;

/// The main error type for configuration operations.
///
/// Marked `#[non_exhaustive]` so new failure kinds can be added without breaking
/// downstream matches.
///
/// # Examples
///
/// ```
/// use hsconfig::domain::errors::ConfigError;
///
/// let error = ConfigError::KeyPathNotFound {
///     path: "branding/theme".to_string(),
/// };
/// assert_eq!(error.to_string(), "Key path not found: branding/theme");
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The persistent store failed (I/O, driver or protocol failure).
    #[error("Store '{backend}' error: {message}")]
    StoreError {
        /// The name of the store backend that failed
        backend: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller-supplied deadline elapsed while a store call was in flight.
    #[error("Deadline exceeded during {operation} for '{domain}'")]
    DeadlineExceeded {
        /// The store operation that was interrupted
        operation: String,
        /// The domain the operation was working on
        domain: String,
    },

    /// A key path did not lead to a value.
    #[error("Key path not found: {path}")]
    KeyPathNotFound {
        /// The path as requested
        path: String,
    },

    /// A key path tried to descend into something that is not an object.
    #[error("Key path '{path}' does not address an object")]
    NotAnObject {
        /// The path prefix that reached the non-object value
        path: String,
    },

    /// A payload could not be interpreted as a configuration document.
    #[error("Invalid document: {message}")]
    InvalidDocument {
        /// The error message
        message: String,
        /// The underlying parse error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Engine settings could not be loaded or written.
    #[error("Settings error: {message}")]
    SettingsError {
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a `StoreError` wrapping an underlying driver error.
    pub fn store<E>(backend: &str, message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::StoreError {
            backend: backend.to_string(),
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Creates an `InvalidDocument` error from a JSON error.
    pub fn from_json_error(message: impl Into<String>, err: serde_json::Error) -> Self {
        ConfigError::InvalidDocument {
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Returns `true` if this error came from the persistent store.
    pub fn is_store_error(&self) -> bool {
        matches!(self, ConfigError::StoreError { .. })
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
