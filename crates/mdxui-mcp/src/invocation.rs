//! Tool call results and recorded invocations.

use chrono::{DateTime, Utc};
use mdxui_core::{Error, InvocationId, Result, ToolName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters of a tool call, keyed by parameter name.
pub type ToolParams = Map<String, Value>;

/// What a tool call produced.
///
/// Like [`TestResult`](mdxui_core::connection::TestResult), the
/// constructors keep "failure carries error, success carries none" while
/// deserialization accepts any combination.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    /// Whether the call succeeded
    pub success: bool,
    /// Tool-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rows written by a mutating statement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
    /// Rows returned by a query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Value>>,
}

impl InvocationResult {
    /// A successful call carrying `data`.
    #[must_use]
    pub const fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            rows_affected: None,
            rows: None,
        }
    }

    /// A failed call.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            rows_affected: None,
            rows: None,
        }
    }

    /// A call abandoned after the configured timeout.
    #[must_use]
    pub fn timed_out() -> Self {
        Self::failed("timeout")
    }

    /// Sets the returned rows.
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Sets the affected row count.
    #[must_use]
    pub const fn with_rows_affected(mut self, rows_affected: u64) -> Self {
        self.rows_affected = Some(rows_affected);
        self
    }

    /// Returns `true` if failure carries an error and success carries none.
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

/// One recorded tool call.
///
/// `timestamp` is when the call started; `duration_ms` is wall-clock time
/// until the result was available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    /// Unique record id
    pub id: InvocationId,
    /// Tool that was called
    pub tool_name: ToolName,
    /// Parameters as supplied by the caller
    pub params: ToolParams,
    /// Outcome
    pub result: InvocationResult,
    /// Start of the call
    pub timestamp: DateTime<Utc>,
    /// Duration in milliseconds, possibly fractional
    pub duration_ms: f64,
}

impl ToolInvocation {
    /// Returns `true` if the recorded call succeeded.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.result.success
    }
}
