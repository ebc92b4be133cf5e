//! Public types must be shareable across Tokio tasks.

use mdxui_mcp::props::{McpToolsPanelProps, ToolHistoryProps};
use mdxui_mcp::*;

const fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_tool_types_are_send_sync() {
    assert_send_sync::<McpToolDefinition>();
    assert_send_sync::<McpToolParameter>();
    assert_send_sync::<ParameterType>();
}

#[test]
fn test_invocation_types_are_send_sync() {
    assert_send_sync::<InvocationResult>();
    assert_send_sync::<ToolInvocation>();
    assert_send_sync::<McpToolsPanelProps>();
    assert_send_sync::<ToolHistoryProps>();
}

#[test]
fn test_executor_is_object_safe() {
    let executors: Vec<Box<dyn ToolExecutor>> = Vec::new();
    assert!(executors.is_empty());
}
