//! Types shared by command-line front ends.
//!
//! # Examples
//!
//! ```
//! use mdxui_core::cli::{ExitCode, OutputFormat};
//! use mdxui_core::Error;
//!
//! let format: OutputFormat = "json".parse().unwrap();
//! assert_eq!(format, OutputFormat::Json);
//!
//! let err = Error::MissingField { field: "url".to_string() };
//! assert_eq!(ExitCode::for_error(&err), ExitCode::VALIDATION_FAILED);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Machine-readable JSON
    Json,
    /// Plain `key: value` lines for scripts
    Text,
    /// Colored output for terminals
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Returns the flag value of the format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "pretty" => Ok(Self::Pretty),
            _ => Err(Error::InvalidArgument(format!(
                "invalid output format: '{s}' (expected: json, text, or pretty)"
            ))),
        }
    }
}

/// Process exit code.
///
/// | code | meaning |
/// |------|---------|
/// | 0 | success |
/// | 1 | unexpected error |
/// | 2 | bad arguments or unreadable input |
/// | 3 | input was read but failed validation |
/// | 4 | an operation timed out |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Command succeeded.
    pub const SUCCESS: Self = Self(0);

    /// Unexpected error.
    pub const ERROR: Self = Self(1);

    /// Bad arguments, or an input file that could not be read or parsed.
    pub const INVALID_INPUT: Self = Self(2);

    /// The input was well-formed but failed validation, or a status
    /// transition was rejected.
    pub const VALIDATION_FAILED: Self = Self(3);

    /// An operation ran out of time.
    pub const TIMEOUT: Self = Self(4);

    /// Wraps a raw exit code.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        Self(code)
    }

    /// Returns the raw exit code.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Returns `true` for [`ExitCode::SUCCESS`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }

    /// Exit code that best describes `err`.
    #[must_use]
    pub const fn for_error(err: &Error) -> Self {
        if err.is_timeout() {
            Self::TIMEOUT
        } else if matches!(
            err,
            Error::InvalidArgument(_) | Error::SerializationError { .. } | Error::ConfigError { .. }
        ) {
            Self::INVALID_INPUT
        } else if err.is_input_error() || err.is_invalid_transition() {
            Self::VALIDATION_FAILED
        } else {
            Self::ERROR
        }
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
