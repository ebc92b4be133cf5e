//! Validates, executes and records tool calls.
//!
//! [`InvocationRecorder`] is the single place tool calls go through. Every
//! call is checked against the tool's input schema before the executor sees
//! it, and every attempt ends up as exactly one [`ToolInvocation`] in the
//! history, whether it failed validation, failed in the executor, timed
//! out or succeeded.
//!
//! The record is appended after the executor future resolves. Dropping an
//! `invoke` future before then leaves the history untouched.

use chrono::Utc;
use mdxui_core::{Error, InvocationId, Result, RuntimeConfig, ToolName};
use std::collections::BTreeMap;
use tokio::time::Instant;

use crate::executor::ToolExecutor;
use crate::invocation::{InvocationResult, ToolInvocation, ToolParams};
use crate::params::validate_params;
use crate::tool::McpToolDefinition;

/// Tool call recorder.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use mdxui_core::{Result, ToolName};
/// use mdxui_mcp::executor::ToolExecutor;
/// use mdxui_mcp::invocation::{InvocationResult, ToolParams};
/// use mdxui_mcp::recorder::InvocationRecorder;
/// use mdxui_mcp::tool::{McpToolDefinition, McpToolParameter};
/// use serde_json::json;
///
/// struct Rows;
///
/// #[async_trait]
/// impl ToolExecutor for Rows {
///     async fn execute(&self, _: &ToolName, _: &ToolParams) -> Result<InvocationResult> {
///         Ok(InvocationResult::ok(None).with_rows(vec![json!({"n": 1})]))
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tool = McpToolDefinition::new("database_query", "Run SQL")
///     .with_parameter("sql", McpToolParameter::string(), true);
/// let mut recorder = InvocationRecorder::new(Rows);
///
/// let params = json!({"sql": "SELECT 1 AS n"}).as_object().cloned().unwrap();
/// let result = recorder.invoke(&tool, params).await;
///
/// assert!(result.success);
/// assert_eq!(recorder.history().len(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct InvocationRecorder<E: ToolExecutor> {
    executor: E,
    tools: BTreeMap<ToolName, McpToolDefinition>,
    history: Vec<ToolInvocation>,
    config: RuntimeConfig,
}

impl<E: ToolExecutor> InvocationRecorder<E> {
    /// Recorder with the default configuration.
    #[must_use]
    pub fn new(executor: E) -> Self {
        Self::from_parts(executor, RuntimeConfig::default())
    }

    /// Recorder with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if `config` fails
    /// [`RuntimeConfig::validate`], for example a zero `history_limit` that
    /// would discard every record.
    pub fn with_config(executor: E, config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(executor, config))
    }

    const fn from_parts(executor: E, config: RuntimeConfig) -> Self {
        Self {
            executor,
            tools: BTreeMap::new(),
            history: Vec::new(),
            config,
        }
    }

    /// Returns the executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Makes `tool` available to [`invoke_by_name`](Self::invoke_by_name)
    /// and [`rerun`](Self::rerun). Replaces a tool of the same name.
    pub fn register_tool(&mut self, tool: McpToolDefinition) {
        tracing::debug!(tool = %tool.name, "tool registered");
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Registered tools, ordered by name.
    pub fn tools(&self) -> impl Iterator<Item = &McpToolDefinition> {
        self.tools.values()
    }

    /// Looks up a registered tool.
    #[must_use]
    pub fn tool(&self, name: &ToolName) -> Option<&McpToolDefinition> {
        self.tools.get(name)
    }

    /// Validates `params` against `tool`, runs it and records the attempt.
    ///
    /// Never fails: validation errors, executor errors and timeouts all
    /// come back as an unsuccessful [`InvocationResult`] with `error` set.
    /// The executor is not called when validation fails.
    pub async fn invoke(&mut self, tool: &McpToolDefinition, params: ToolParams) -> InvocationResult {
        let timestamp = Utc::now();
        let start = Instant::now();

        let result = match validate_params(tool, &params, &self.config.validation) {
            Err(err) => {
                tracing::warn!(tool = %tool.name, error = %err, "tool parameters rejected");
                InvocationResult::failed(err.to_string())
            }
            Ok(()) => self.execute(&tool.name, &params).await,
        };

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.record(ToolInvocation {
            id: InvocationId::generate(),
            tool_name: tool.name.clone(),
            params,
            result: result.clone(),
            timestamp,
            duration_ms,
        });
        result
    }

    async fn execute(&self, tool_name: &ToolName, params: &ToolParams) -> InvocationResult {
        tracing::debug!(tool = %tool_name, "executing tool");
        let call = self.executor.execute(tool_name, params);
        let outcome = match self.config.invocation_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        tool = %tool_name,
                        timeout_ms = limit.as_millis(),
                        "tool call timed out"
                    );
                    return InvocationResult::timed_out();
                }
            },
            None => call.await,
        };

        match outcome {
            Ok(result) => {
                if !result.is_consistent() {
                    tracing::warn!(tool = %tool_name, "executor returned an inconsistent result");
                }
                result
            }
            Err(err) => {
                tracing::warn!(tool = %tool_name, error = %err, "tool call failed");
                InvocationResult::failed(err.to_string())
            }
        }
    }

    /// Invokes a registered tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] if no tool of that name is
    /// registered. Nothing is recorded in that case.
    pub async fn invoke_by_name(
        &mut self,
        name: &ToolName,
        params: ToolParams,
    ) -> Result<InvocationResult> {
        let tool = self.tools.get(name).cloned().ok_or_else(|| tool_not_found(name))?;
        Ok(self.invoke(&tool, params).await)
    }

    /// Replays a recorded invocation as a new attempt.
    ///
    /// The original record is left as it was; the replay is appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] if the invocation is not in the
    /// history or its tool is not registered.
    pub async fn rerun(&mut self, id: &InvocationId) -> Result<InvocationResult> {
        let past = self
            .history
            .iter()
            .find(|inv| &inv.id == id)
            .ok_or_else(|| Error::ResourceNotFound {
                resource: format!("invocation {id}"),
            })?;
        let tool_name = past.tool_name.clone();
        let params = past.params.clone();

        tracing::debug!(invocation = %id, tool = %tool_name, "rerunning invocation");
        self.invoke_by_name(&tool_name, params).await
    }

    fn record(&mut self, invocation: ToolInvocation) {
        self.history.push(invocation);
        if let Some(limit) = self.config.history_limit
            && self.history.len() > limit
        {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
        }
    }

    /// Recorded invocations, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ToolInvocation] {
        &self.history
    }

    /// Up to `max_items` invocations, newest first.
    pub fn recent(&self, max_items: usize) -> impl Iterator<Item = &ToolInvocation> {
        self.history.iter().rev().take(max_items)
    }

    /// Looks up a recorded invocation.
    #[must_use]
    pub fn get(&self, id: &InvocationId) -> Option<&ToolInvocation> {
        self.history.iter().find(|inv| &inv.id == id)
    }

    /// Drops every recorded invocation.
    pub fn clear_history(&mut self) {
        tracing::debug!(dropped = self.history.len(), "invocation history cleared");
        self.history.clear();
    }
}

fn tool_not_found(name: &ToolName) -> Error {
    Error::ResourceNotFound {
        resource: format!("tool {name}"),
    }
}
