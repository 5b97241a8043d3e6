//! Error handling for the hybrid-map library
//!
//! This module provides the crate-wide error type and `Result` alias. All
//! fallible operations on a [`HybridMap`](crate::HybridMap) report failures
//! through [`HybridError`]; resolution failures are detected before any
//! mutation occurs, so a failing operation leaves the container unmodified.

use thiserror::Error;

/// Main error type for the hybrid-map library
#[derive(Error, Debug)]
pub enum HybridError {
    /// A strict fetch found no stored value and no fallback was supplied
    #[error("key not found: {key}")]
    KeyNotFound {
        /// Description of the requested key
        key: String,
    },

    /// A negative key resolved below zero under error mode
    #[error("index out of range: {index} (next key {next_key})")]
    IndexOutOfRange {
        /// The requested index
        index: i64,
        /// One past the highest integer key in use at resolution time
        next_key: i64,
    },

    /// A caller supplied an argument of the wrong capability
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem
        message: String,
    },
}

impl HybridError {
    /// Create a key-not-found error
    pub fn key_not_found<S: Into<String>>(key: S) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Create an index-out-of-range error
    pub fn index_out_of_range(index: i64, next_key: i64) -> Self {
        Self::IndexOutOfRange { index, next_key }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::KeyNotFound { .. } => "key",
            Self::IndexOutOfRange { .. } => "bounds",
            Self::InvalidArgument { .. } => "argument",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HybridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = HybridError::key_not_found("\"x\"");
        assert_eq!(err.category(), "key");
        assert!(err.to_string().contains("key not found"));

        let err = HybridError::index_out_of_range(-5, 2);
        assert_eq!(err.category(), "bounds");
        assert!(err.to_string().contains("-5"));

        let err = HybridError::invalid_argument("no enumeration capability");
        assert_eq!(err.category(), "argument");
    }
}
