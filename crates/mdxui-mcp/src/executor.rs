//! The agent-side collaborator that runs tool calls.

use async_trait::async_trait;
use mdxui_core::{Result, ToolName};
use std::sync::Arc;

use crate::invocation::{InvocationResult, ToolParams};

/// Executes validated tool calls.
///
/// Implementations only see parameters that already passed
/// [`validate_params`](crate::params::validate_params). Returning an error
/// is the normal way to report a failed call: the recorder folds it into an
/// unsuccessful [`InvocationResult`].
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use mdxui_core::{Result, ToolName};
/// use mdxui_mcp::executor::ToolExecutor;
/// use mdxui_mcp::invocation::{InvocationResult, ToolParams};
///
/// struct Echo;
///
/// #[async_trait]
/// impl ToolExecutor for Echo {
///     async fn execute(&self, _tool: &ToolName, params: &ToolParams) -> Result<InvocationResult> {
///         Ok(InvocationResult::ok(Some(params.clone().into())))
///     }
/// }
/// ```
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Runs `tool_name` with `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool failed or its backend was unreachable.
    async fn execute(&self, tool_name: &ToolName, params: &ToolParams) -> Result<InvocationResult>;
}

#[async_trait]
impl<T: ToolExecutor + ?Sized> ToolExecutor for Arc<T> {
    async fn execute(&self, tool_name: &ToolName, params: &ToolParams) -> Result<InvocationResult> {
        (**self).execute(tool_name, params).await
    }
}
