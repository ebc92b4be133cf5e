//! MCP tool contracts for the mdxui database studio.
//!
//! An AI agent is offered tools ([`tool::McpToolDefinition`]) whose inputs
//! are described by a small JSON-Schema subset. Calls go through an
//! [`recorder::InvocationRecorder`], which:
//!
//! - validates parameters before anything runs ([`params::validate_params`])
//! - delegates to a host-provided [`executor::ToolExecutor`]
//! - times the call and records it as a [`invocation::ToolInvocation`]
//!
//! Failures never escape `invoke`; they are folded into the recorded
//! [`invocation::InvocationResult`].
//!
//! # Examples
//!
//! ```
//! use mdxui_core::ValidationConfig;
//! use mdxui_mcp::params::validate_params;
//! use mdxui_mcp::tool::McpToolDefinition;
//! use serde_json::json;
//!
//! let tool = McpToolDefinition::from_json(
//!     &json!({
//!         "name": "tag_rows",
//!         "description": "Attach tags",
//!         "inputSchema": {
//!             "type": "object",
//!             "properties": {"tags": {"type": "array", "items": {"type": "string"}}},
//!             "required": ["tags"]
//!         }
//!     }),
//!     &ValidationConfig::default(),
//! )?;
//!
//! let good = json!({"tags": ["a", "b"]});
//! let bad = json!({"tags": [1, 2]});
//! let config = ValidationConfig::default();
//! assert!(validate_params(&tool, good.as_object().unwrap(), &config).is_ok());
//! assert!(validate_params(&tool, bad.as_object().unwrap(), &config).is_err());
//! # Ok::<(), mdxui_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod executor;
pub mod invocation;
pub mod params;
pub mod props;
pub mod recorder;
pub mod tool;

pub use executor::ToolExecutor;
pub use invocation::{InvocationResult, ToolInvocation, ToolParams};
pub use recorder::InvocationRecorder;
pub use tool::{McpToolDefinition, McpToolParameter, ParameterType};
