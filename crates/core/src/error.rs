//! Error types for domwatch.

use alloc::string::String;

/// Result type alias for domwatch operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for subscription setup, selector handling and host queries.
///
/// A timed-out wait is not an error: waiters resolve to `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The caller configured a subscription or waiter incorrectly.
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
    },
    /// The host rejected the syntax of a selector.
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        selector: String,
        reason: String,
    },
    /// A query result had a shape that cannot be enumerated as nodes.
    #[error("Unsupported result type: {kind} (only snapshot or iterator results are supported)")]
    UnsupportedResult {
        kind: String,
    },
    /// Invalid operation.
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        message: String,
    },
}

impl Error {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Creates an invalid selector error.
    pub fn invalid_selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidSelector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unsupported result error.
    pub fn unsupported_result(kind: impl Into<String>) -> Self {
        Error::UnsupportedResult { kind: kind.into() }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[inline]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }
}
