//! Error types for the studio data contracts.
//!
//! Every fallible operation in the workspace returns [`Error`]. Validation
//! failures carry the offending field so a rendering layer can attach the
//! message to the right form control.
//!
//! # Examples
//!
//! ```
//! use mdxui_core::{Error, Result};
//!
//! fn require_name(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::MissingField {
//!             field: "name".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = require_name("").unwrap_err();
//! assert!(err.is_missing_field());
//! ```

use crate::connection::{ConnectionEvent, ConnectionStatus};
use thiserror::Error;

/// Main error type for the studio contracts.
#[derive(Error, Debug)]
pub enum Error {
    /// The `adapter` discriminant was missing or not a known adapter kind.
    #[error("Unknown adapter: {}", found.as_deref().unwrap_or("<missing>"))]
    UnknownAdapter {
        /// The discriminant value that was found, if any
        found: Option<String>,
    },

    /// A required field was absent (or `null`).
    #[error("Missing required field: {field}")]
    MissingField {
        /// Path of the missing field
        field: String,
    },

    /// A field was present but had the wrong JSON type.
    #[error("Type mismatch in {field}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Path of the offending field
        field: String,
        /// Expected JSON type
        expected: String,
        /// JSON type that was actually found
        found: String,
    },

    /// A connection status transition outside the allowed table.
    ///
    /// The connection is left in `from`.
    #[error("Invalid transition: cannot apply '{event}' while {from}")]
    InvalidTransition {
        /// Status the connection was in
        from: ConnectionStatus,
        /// Event that was rejected
        event: ConnectionEvent,
    },

    /// An external collaborator (driver, agent) failed.
    #[error("Execution failed: {message}")]
    ExecutionFailure {
        /// Description of the failure
        message: String,
        /// Underlying error, if the collaborator provided one
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An optional capability that the handler does not provide.
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Name of the missing capability
        feature: String,
    },

    /// Field-level constraint violation (enum membership, ranges, policies).
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// Nested parameter schemas or values exceeded the configured depth.
    #[error("Nesting too deep at {field} (limit {limit})")]
    RecursionLimit {
        /// Path where the limit was hit
        field: String,
        /// Configured maximum depth
        limit: usize,
    },

    /// Lookup of an unknown connection, invocation or tool.
    #[error("Resource not found: {resource}")]
    ResourceNotFound {
        /// Identifier of the missing resource
        resource: String,
    },

    /// Invalid or contradictory configuration.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// An operation exceeded its timeout.
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Timeout that elapsed, in milliseconds
        duration_ms: u64,
    },

    /// JSON conversion failure.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Invalid CLI argument or function parameter.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns `true` if this is an unknown adapter error.
    #[must_use]
    pub const fn is_unknown_adapter(&self) -> bool {
        matches!(self, Self::UnknownAdapter { .. })
    }

    /// Returns `true` if this is a missing field error.
    #[must_use]
    pub const fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }

    /// Returns `true` if this is a type mismatch error.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns `true` if this is a rejected status transition.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdxui_core::connection::{ConnectionEvent, ConnectionStatus};
    ///
    /// let err = ConnectionStatus::Connected
    ///     .transition(ConnectionEvent::Retry)
    ///     .unwrap_err();
    /// assert!(err.is_invalid_transition());
    /// ```
    #[must_use]
    pub const fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Returns `true` if this is an execution failure.
    #[must_use]
    pub const fn is_execution_failure(&self) -> bool {
        matches!(self, Self::ExecutionFailure { .. })
    }

    /// Returns `true` if this is a not-implemented error.
    #[must_use]
    pub const fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }

    /// Returns `true` if this is a field constraint violation.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns `true` if the nesting limit was hit.
    #[must_use]
    pub const fn is_recursion_limit(&self) -> bool {
        matches!(self, Self::RecursionLimit { .. })
    }

    /// Returns `true` if this is a resource not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` for errors caused by malformed input.
    ///
    /// These are the errors a form or API layer reports back to the user,
    /// as opposed to failures of an external collaborator.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdxui_core::Error;
    ///
    /// let err = Error::MissingField { field: "url".to_string() };
    /// assert!(err.is_input_error());
    ///
    /// let err = Error::ExecutionFailure { message: "boom".to_string(), source: None };
    /// assert!(!err.is_input_error());
    /// ```
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownAdapter { .. }
                | Self::MissingField { .. }
                | Self::TypeMismatch { .. }
                | Self::ValidationError { .. }
                | Self::RecursionLimit { .. }
                | Self::SerializationError { .. }
                | Self::InvalidArgument(_)
        )
    }

    /// Returns the field path this error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field }
            | Self::TypeMismatch { field, .. }
            | Self::ValidationError { field, .. }
            | Self::RecursionLimit { field, .. } => Some(field),
            Self::UnknownAdapter { .. } => Some("adapter"),
            _ => None,
        }
    }

    /// Wraps an arbitrary collaborator error into [`Error::ExecutionFailure`].
    pub fn execution(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        let source = err.into();
        Self::ExecutionFailure {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_adapter_display() {
        let err = Error::UnknownAdapter {
            found: Some("mysql".to_string()),
        };
        assert_eq!(err.to_string(), "Unknown adapter: mysql");

        let err = Error::UnknownAdapter { found: None };
        assert_eq!(err.to_string(), "Unknown adapter: <missing>");
        assert!(err.is_unknown_adapter());
        assert_eq!(err.field(), Some("adapter"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = Error::InvalidTransition {
            from: ConnectionStatus::Disconnected,
            event: ConnectionEvent::Disconnect,
        };
        let display = err.to_string();
        assert!(display.contains("disconnect"));
        assert!(display.contains("disconnected"));
        assert!(err.is_invalid_transition());
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_type_mismatch_detection() {
        let err = Error::TypeMismatch {
            field: "syncInterval".to_string(),
            expected: "number".to_string(),
            found: "string".to_string(),
        };
        assert!(err.is_type_mismatch());
        assert!(err.is_input_error());
        assert_eq!(err.field(), Some("syncInterval"));
    }

    #[test]
    fn test_execution_wrapper_keeps_message() {
        let err = Error::execution("socket closed");
        assert!(err.is_execution_failure());
        assert_eq!(err.to_string(), "Execution failed: socket closed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = serde_err.into();
        assert!(matches!(err, Error::SerializationError { .. }));
    }

    #[test]
    fn test_timeout_detection() {
        let err = Error::Timeout {
            operation: "test_connection".to_string(),
            duration_ms: 500,
        };
        assert!(err.is_timeout());
        assert!(!err.is_not_found());
        assert!(err.field().is_none());
    }
}
