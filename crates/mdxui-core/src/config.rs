//! Runtime configuration for validation and execution.
//!
//! # Examples
//!
//! ```
//! use mdxui_core::{RuntimeConfig, UnknownFieldPolicy};
//! use std::time::Duration;
//!
//! let config = RuntimeConfig::default();
//! assert_eq!(config.validation.unknown_fields, UnknownFieldPolicy::Ignore);
//! assert!(config.invocation_timeout.is_none());
//!
//! let strict = RuntimeConfig::builder()
//!     .unknown_fields(UnknownFieldPolicy::Reject)
//!     .invocation_timeout(Duration::from_secs(10))
//!     .build();
//! assert_eq!(strict.validation.unknown_fields, UnknownFieldPolicy::Reject);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default maximum nesting of parameter schemas and values.
pub const DEFAULT_MAX_PARAMETER_DEPTH: usize = 16;

/// What to do with object fields a shape does not declare.
///
/// The same policy applies to connection configs and to tool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Drop undeclared fields silently.
    #[default]
    Ignore,
    /// Fail validation on the first undeclared field.
    Reject,
}

impl UnknownFieldPolicy {
    /// Returns the string representation of the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for UnknownFieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnknownFieldPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            _ => Err(Error::InvalidArgument(format!(
                "invalid unknown field policy: '{s}' (expected: ignore or reject)"
            ))),
        }
    }
}

/// Settings that shape input validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Policy for undeclared object fields.
    /// Default: ignore
    pub unknown_fields: UnknownFieldPolicy,

    /// Maximum nesting depth of `items` in parameter schemas, and of array
    /// values checked against them.
    /// Default: 16
    pub max_parameter_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Ignore,
            max_parameter_depth: DEFAULT_MAX_PARAMETER_DEPTH,
        }
    }
}

/// Runtime configuration for the studio contracts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    /// Validation settings.
    pub validation: ValidationConfig,

    /// Upper bound on a single tool invocation.
    ///
    /// When elapsed the invocation is recorded as failed with
    /// `error: "timeout"`. Default: None (no timeout)
    pub invocation_timeout: Option<Duration>,

    /// Upper bound on a connection test.
    /// Default: None (no timeout)
    pub connection_test_timeout: Option<Duration>,

    /// Upper bound on a handler `connect` call.
    ///
    /// When elapsed the connection moves to `error` and the caller gets
    /// [`Error::Timeout`]. Default: None (no timeout)
    pub connect_timeout: Option<Duration>,

    /// Maximum number of invocations kept in history.
    ///
    /// Oldest entries are dropped first. Default: None (unbounded)
    pub history_limit: Option<usize>,
}

impl RuntimeConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::new()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if:
    /// - `max_parameter_depth` is zero
    /// - a timeout is zero
    /// - `history_limit` is zero
    ///
    /// [`ConnectionRegistry::with_config`](crate::connection::ConnectionRegistry::with_config)
    /// runs this check before accepting a configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdxui_core::RuntimeConfig;
    ///
    /// assert!(RuntimeConfig::default().validate().is_ok());
    ///
    /// let mut invalid = RuntimeConfig::default();
    /// invalid.history_limit = Some(0);
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.validation.max_parameter_depth == 0 {
            return Err(config_error("max_parameter_depth must be greater than zero"));
        }

        if self.invocation_timeout.is_some_and(|t| t.is_zero()) {
            return Err(config_error("invocation_timeout must be greater than zero"));
        }

        if self.connection_test_timeout.is_some_and(|t| t.is_zero()) {
            return Err(config_error(
                "connection_test_timeout must be greater than zero",
            ));
        }

        if self.connect_timeout.is_some_and(|t| t.is_zero()) {
            return Err(config_error("connect_timeout must be greater than zero"));
        }

        if self.history_limit == Some(0) {
            return Err(config_error("history_limit must be greater than zero"));
        }

        Ok(())
    }
}

fn config_error(message: &str) -> Error {
    Error::ConfigError {
        message: message.to_string(),
    }
}

/// Builder for [`RuntimeConfig`].
#[derive(Debug)]
pub struct RuntimeConfigBuilder {
    config: RuntimeConfig,
}

impl RuntimeConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
        }
    }

    /// Sets the policy for undeclared fields.
    #[must_use]
    pub const fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.config.validation.unknown_fields = policy;
        self
    }

    /// Sets the maximum parameter nesting depth.
    #[must_use]
    pub const fn max_parameter_depth(mut self, depth: usize) -> Self {
        self.config.validation.max_parameter_depth = depth;
        self
    }

    /// Sets the tool invocation timeout.
    #[must_use]
    pub const fn invocation_timeout(mut self, timeout: Duration) -> Self {
        self.config.invocation_timeout = Some(timeout);
        self
    }

    /// Sets the connection test timeout.
    #[must_use]
    pub const fn connection_test_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_test_timeout = Some(timeout);
        self
    }

    /// Sets the handler connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Caps the invocation history length.
    #[must_use]
    pub const fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = Some(limit);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> RuntimeConfig {
        self.config
    }
}

impl Default for RuntimeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();

        assert_eq!(config.validation.unknown_fields, UnknownFieldPolicy::Ignore);
        assert_eq!(
            config.validation.max_parameter_depth,
            DEFAULT_MAX_PARAMETER_DEPTH
        );
        assert!(config.invocation_timeout.is_none());
        assert!(config.connection_test_timeout.is_none());
        assert!(config.connect_timeout.is_none());
        assert!(config.history_limit.is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(RuntimeConfig::default().validate().is_ok());

        let zero_depth = RuntimeConfig::builder().max_parameter_depth(0).build();
        assert!(zero_depth.validate().unwrap_err().is_config_error());

        let zero_timeout = RuntimeConfig::builder()
            .invocation_timeout(Duration::ZERO)
            .build();
        assert!(zero_timeout.validate().is_err());

        let zero_test_timeout = RuntimeConfig::builder()
            .connection_test_timeout(Duration::ZERO)
            .build();
        assert!(zero_test_timeout.validate().is_err());

        let zero_connect_timeout = RuntimeConfig::builder()
            .connect_timeout(Duration::ZERO)
            .build();
        assert!(zero_connect_timeout.validate().is_err());

        let zero_history = RuntimeConfig::builder().history_limit(0).build();
        assert!(zero_history.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_config_builder() {
        let config = RuntimeConfig::builder()
            .unknown_fields(UnknownFieldPolicy::Reject)
            .max_parameter_depth(4)
            .invocation_timeout(Duration::from_secs(5))
            .connection_test_timeout(Duration::from_millis(750))
            .connect_timeout(Duration::from_secs(3))
            .history_limit(50)
            .build();

        assert_eq!(config.validation.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(config.validation.max_parameter_depth, 4);
        assert_eq!(config.invocation_timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            config.connection_test_timeout,
            Some(Duration::from_millis(750))
        );
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.history_limit, Some(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_policy_parsing() {
        assert_eq!(
            "ignore".parse::<UnknownFieldPolicy>().unwrap(),
            UnknownFieldPolicy::Ignore
        );
        assert_eq!(
            "REJECT".parse::<UnknownFieldPolicy>().unwrap(),
            UnknownFieldPolicy::Reject
        );
        assert!("strip".parse::<UnknownFieldPolicy>().is_err());
        assert_eq!(UnknownFieldPolicy::Reject.to_string(), "reject");
    }

    #[test]
    fn test_validation_config_serde_defaults() {
        let config: ValidationConfig = serde_json::from_str(r#"{"unknown_fields":"reject"}"#)
            .unwrap();
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(config.max_parameter_depth, DEFAULT_MAX_PARAMETER_DEPTH);
    }
}
