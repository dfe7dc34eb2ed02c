// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for opblock
//!
//! Interception never turns its own failures into caller-visible errors:
//! extraction problems are recovered inside the interceptors. The variants
//! here surface from the real primitives, configuration loading and XHR
//! misuse.

use thiserror::Error;

/// Result type alias for opblock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for opblock
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body could not be read for inspection
    #[error("Body extraction failed: {reason}")]
    Extraction { reason: String, url: Option<String> },

    /// XHR operation called in the wrong state
    #[error("Invalid state for {operation}: {state}")]
    InvalidState { operation: String, state: String },

    /// Network failure reported by a real primitive
    #[error("Network error: {0}")]
    Network(String),

    /// Interceptors were already installed for this process
    #[error("Interceptors are already installed")]
    AlreadyInstalled,

    /// Interceptors have not been installed yet
    #[error("Interceptors are not installed")]
    NotInstalled,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create an extraction error
    pub fn extraction<S: Into<String>>(reason: S) -> Self {
        Error::Extraction {
            reason: reason.into(),
            url: None,
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(operation: impl Into<String>, state: impl Into<String>) -> Self {
        Error::InvalidState {
            operation: operation.into(),
            state: state.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Http(_))
    }

    /// Check if this is a body extraction failure
    pub fn is_extraction(&self) -> bool {
        matches!(self, Error::Extraction { .. })
    }

    /// Check if this is recoverable (can retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::Network(_) => true,
            _ => false,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Extraction { url: Some(u), .. } => Some(u),
            Error::Http(e) => e.url().map(|u| u.as_str()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add URL context to error
    fn with_url(self, url: &str) -> Result<T>;

    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_url(self, url: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Extraction { reason, .. } => Error::Extraction {
                reason,
                url: Some(url.to_string()),
            },
            other => other,
        })
    }

    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}
