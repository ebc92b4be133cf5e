//! Integration tests for tool validation and the invocation recorder.
//!
//! A counting executor stands in for the agent backend so the tests can
//! observe whether execution was attempted at all.

use async_trait::async_trait;
use mdxui_core::{Error, Result, RuntimeConfig, ToolName, UnknownFieldPolicy, ValidationConfig};
use mdxui_mcp::props::{McpToolsPanelProps, ToolHistoryProps};
use mdxui_mcp::{
    InvocationRecorder, InvocationResult, McpToolDefinition, ToolExecutor, ToolParams,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct CountingExecutor {
    calls: AtomicUsize,
}

impl CountingExecutor {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolExecutor for CountingExecutor {
    async fn execute(&self, tool_name: &ToolName, params: &ToolParams) -> Result<InvocationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match tool_name.as_str() {
            "database_query" => Ok(InvocationResult::ok(None)
                .with_rows(vec![json!({"sql": params["sql"].clone()})])),
            "database_mutate" => Ok(InvocationResult::ok(None).with_rows_affected(3)),
            other => Err(Error::execution(format!("no backend for {other}"))),
        }
    }
}

fn params(value: Value) -> ToolParams {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn database_query_tool() -> McpToolDefinition {
    McpToolDefinition::from_json(
        &json!({
            "name": "database_query",
            "description": "Execute a read-only SQL query",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "sql": {"type": "string", "description": "SQL to run"},
                    "connectionId": {"type": "string", "description": "Target connection"}
                },
                "required": ["sql", "connectionId"]
            }
        }),
        &ValidationConfig::default(),
    )
    .unwrap()
}

fn tag_tool() -> McpToolDefinition {
    McpToolDefinition::from_json(
        &json!({
            "name": "database_mutate",
            "description": "Tag rows",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "tags": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["tags"]
            }
        }),
        &ValidationConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_missing_required_param_never_reaches_executor() {
    let executor = Arc::new(CountingExecutor::default());
    let mut recorder = InvocationRecorder::new(Arc::clone(&executor));

    let result = recorder
        .invoke(&database_query_tool(), params(json!({"sql": "SELECT 1"})))
        .await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("connectionId"));
    assert_eq!(executor.calls(), 0);

    let history = recorder.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].params["sql"], "SELECT 1");
    assert!(history[0].result.is_consistent());
}

#[tokio::test]
async fn test_array_items_are_typed() {
    let executor = Arc::new(CountingExecutor::default());
    let mut recorder = InvocationRecorder::new(Arc::clone(&executor));
    let tool = tag_tool();

    let accepted = recorder.invoke(&tool, params(json!({"tags": ["a", "b"]}))).await;
    assert!(accepted.success);
    assert_eq!(accepted.rows_affected, Some(3));

    let rejected = recorder.invoke(&tool, params(json!({"tags": [1, 2]}))).await;
    assert!(!rejected.success);
    assert!(rejected.error.as_deref().unwrap().contains("tags[0]"));

    assert_eq!(executor.calls(), 1);
    assert_eq!(recorder.history().len(), 2);
}

#[tokio::test]
async fn test_every_attempt_is_recorded_in_order() {
    let executor = Arc::new(CountingExecutor::default());
    let mut recorder = InvocationRecorder::new(Arc::clone(&executor));
    recorder.register_tool(database_query_tool());
    recorder.register_tool(McpToolDefinition::new("schema_dump", "No backend wired up"));

    let ok = recorder
        .invoke_by_name(
            &ToolName::new("database_query"),
            params(json!({"sql": "SELECT * FROM users", "connectionId": "conn-1"})),
        )
        .await
        .unwrap();
    let failed = recorder
        .invoke_by_name(&ToolName::new("schema_dump"), ToolParams::new())
        .await
        .unwrap();

    assert!(ok.success);
    assert_eq!(ok.rows.unwrap()[0]["sql"], "SELECT * FROM users");
    assert!(!failed.success);
    assert!(failed.error.unwrap().contains("no backend for schema_dump"));

    let names: Vec<_> = recorder
        .history()
        .iter()
        .map(|inv| inv.tool_name.as_str())
        .collect();
    assert_eq!(names, ["database_query", "schema_dump"]);
    assert!(recorder.history()[0].timestamp <= recorder.history()[1].timestamp);
    assert_eq!(executor.calls(), 2);
}

#[tokio::test]
async fn test_strict_policy_rejects_unknown_params() {
    let config = RuntimeConfig::builder()
        .unknown_fields(UnknownFieldPolicy::Reject)
        .build();
    let executor = Arc::new(CountingExecutor::default());
    let mut recorder = InvocationRecorder::with_config(Arc::clone(&executor), config).unwrap();

    let result = recorder
        .invoke(
            &database_query_tool(),
            params(json!({"sql": "SELECT 1", "connectionId": "c", "explain": true})),
        )
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("explain"));
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_dropped_invoke_records_nothing() {
    let mut recorder = InvocationRecorder::new(CountingExecutor::default());
    let tool = database_query_tool();

    {
        let pending = recorder.invoke(
            &tool,
            params(json!({"sql": "SELECT 1", "connectionId": "c"})),
        );
        drop(pending);
    }

    assert!(recorder.history().is_empty());
}

#[tokio::test]
async fn test_panel_props_reflect_recorder() {
    let mut recorder = InvocationRecorder::new(CountingExecutor::default());
    recorder.register_tool(database_query_tool());
    recorder.register_tool(tag_tool());
    recorder
        .invoke(&tag_tool(), params(json!({"tags": ["x"]})))
        .await;

    let panel = McpToolsPanelProps::from_recorder(&recorder);
    assert_eq!(panel.tools.len(), 2);
    assert_eq!(panel.history.len(), 1);

    let json = serde_json::to_value(&panel).unwrap();
    assert_eq!(json["tools"][0]["inputSchema"]["type"], "object");
    assert_eq!(json["history"][0]["toolName"], "database_mutate");

    let history = ToolHistoryProps {
        history: panel.history,
        max_items: Some(10),
    };
    assert_eq!(history.visible().count(), 1);
}
