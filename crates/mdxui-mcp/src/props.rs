//! Serializable props of the MCP tools panel and its parts.

use serde::{Deserialize, Serialize};

use crate::executor::ToolExecutor;
use crate::invocation::{ToolInvocation, ToolParams};
use crate::params::with_defaults;
use crate::recorder::InvocationRecorder;
use crate::tool::McpToolDefinition;

/// Props of the natural-language-to-SQL box.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalLanguageQueryProps {
    /// Question typed by the user
    pub query: String,
    /// SQL produced by the model
    #[serde(rename = "generatedSQL", default, skip_serializing_if = "Option::is_none")]
    pub generated_sql: Option<String>,
    /// Model identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// System prompt sent with the question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// SQL generation in progress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_generating: Option<bool>,
    /// Generated SQL is running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_executing: Option<bool>,
    /// Last error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Props of the MCP tools panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolsPanelProps {
    /// Available tools
    pub tools: Vec<McpToolDefinition>,
    /// Past invocations, oldest first
    pub history: Vec<ToolInvocation>,
    /// Natural language box state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_language_query: Option<NaturalLanguageQueryProps>,
    /// Tool filter text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    /// Show the history list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_history: Option<bool>,
    /// Show the natural language box
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_natural_language: Option<bool>,
    /// Extra CSS class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl McpToolsPanelProps {
    /// Snapshot of a recorder's tools and history.
    #[must_use]
    pub fn from_recorder<E: ToolExecutor>(recorder: &InvocationRecorder<E>) -> Self {
        Self {
            tools: recorder.tools().cloned().collect(),
            history: recorder.history().to_vec(),
            ..Self::default()
        }
    }

    /// Tools matching `search_query`.
    #[must_use]
    pub fn filtered_tools(&self) -> Vec<&McpToolDefinition> {
        filter_tools(&self.tools, self.search_query.as_deref())
    }
}

/// Props of the tool list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolListProps {
    /// Tools to list
    pub tools: Vec<McpToolDefinition>,
    /// Highlighted tool name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_tool: Option<String>,
    /// Filter text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

impl ToolListProps {
    /// Tools matching `search_query`.
    #[must_use]
    pub fn visible_tools(&self) -> Vec<&McpToolDefinition> {
        filter_tools(&self.tools, self.search_query.as_deref())
    }

    /// The highlighted tool, if it is in the list.
    #[must_use]
    pub fn selected(&self) -> Option<&McpToolDefinition> {
        let name = self.selected_tool.as_deref()?;
        self.tools.iter().find(|t| t.name.as_str() == name)
    }
}

/// Case-insensitive match on name or description. Blank queries match all.
fn filter_tools<'a>(tools: &'a [McpToolDefinition], query: Option<&str>) -> Vec<&'a McpToolDefinition> {
    let needle = query.map(str::trim).unwrap_or_default().to_lowercase();
    tools
        .iter()
        .filter(|t| {
            needle.is_empty()
                || t.name.as_str().to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Props of the parameter form for one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocationFormProps {
    /// Tool being invoked
    pub tool: McpToolDefinition,
    /// Invocation in progress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_loading: Option<bool>,
    /// Error from the last attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolInvocationFormProps {
    /// Form for `tool`.
    #[must_use]
    pub const fn new(tool: McpToolDefinition) -> Self {
        Self {
            tool,
            is_loading: None,
            error: None,
        }
    }

    /// Values the form starts with: every declared default.
    #[must_use]
    pub fn initial_params(&self) -> ToolParams {
        with_defaults(&self.tool, &ToolParams::new())
    }
}

/// Props of the invocation history list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolHistoryProps {
    /// Past invocations, oldest first
    pub history: Vec<ToolInvocation>,
    /// Maximum entries shown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl ToolHistoryProps {
    /// Entries to render: newest first, capped at `max_items`.
    pub fn visible(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.history
            .iter()
            .rev()
            .take(self.max_items.unwrap_or(usize::MAX))
    }
}
