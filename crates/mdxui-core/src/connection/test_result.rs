//! Result of a connection test.
//!
//! Deserialization is lenient: `{"success": false, "latencyMs": 12}` parses
//! even though a failed test should explain itself. The constructors always
//! produce consistent values, and [`TestResult::is_consistent`] lets callers
//! flag payloads that break the convention.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Outcome of testing a connection config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Whether the backend was reachable with the given credentials
    pub success: bool,
    /// Round-trip latency in milliseconds, possibly fractional
    pub latency_ms: f64,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Server version reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
    /// Tables visible to the connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<String>>,
}

impl TestResult {
    /// A successful test.
    #[must_use]
    pub const fn ok(latency_ms: f64) -> Self {
        Self {
            success: true,
            latency_ms,
            error: None,
            server_version: None,
            tables: None,
        }
    }

    /// A failed test with its reason.
    #[must_use]
    pub fn failed(latency_ms: f64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            latency_ms,
            error: Some(error.into()),
            server_version: None,
            tables: None,
        }
    }

    /// A test abandoned after `latency_ms`.
    #[must_use]
    pub fn timed_out(latency_ms: f64) -> Self {
        Self::failed(latency_ms, "timeout")
    }

    /// Sets the reported server version.
    #[must_use]
    pub fn with_server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = Some(version.into());
        self
    }

    /// Sets the visible tables.
    #[must_use]
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    /// Returns `true` if failure carries an error and success carries none.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdxui_core::connection::TestResult;
    ///
    /// assert!(TestResult::ok(5.0).is_consistent());
    /// assert!(TestResult::failed(5.0, "refused").is_consistent());
    ///
    /// let bare: TestResult = serde_json::from_str(r#"{"success":false,"latencyMs":12}"#).unwrap();
    /// assert!(!bare.is_consistent());
    /// ```
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.success == self.error.is_none()
    }

    /// Like [`is_consistent`](Self::is_consistent), as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] on field `error` when the
    /// convention is broken.
    pub fn check_consistency(&self) -> Result<()> {
        if self.is_consistent() {
            return Ok(());
        }
        let reason = if self.success {
            "successful result must not carry an error"
        } else {
            "failed result must carry an error"
        };
        Err(Error::ValidationError {
            field: "error".to_string(),
            reason: reason.to_string(),
        })
    }
}
