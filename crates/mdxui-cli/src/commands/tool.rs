//! Tool command implementation.
//!
//! Validates MCP tool definitions and checks parameter files against them.

use crate::ToolAction;
use crate::commands::common::{print_report, read_json, validation_config};
use anyhow::Result;
use mdxui_core::cli::{ExitCode, OutputFormat};
use mdxui_core::validation::type_mismatch;
use mdxui_core::{Error, ValidationConfig};
use mdxui_mcp::params::{validate_params, with_defaults};
use mdxui_mcp::{McpToolDefinition, ToolParams};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// One parameter of a validated tool.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ParameterSummary {
    /// Parameter name
    pub name: String,
    /// Parameter type
    #[serde(rename = "type")]
    pub param_type: String,
    /// Whether callers must supply it
    pub required: bool,
    /// Nesting depth through `items`
    pub depth: usize,
}

/// Result of validating a tool definition.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolReport {
    /// Path of the checked file
    pub file: String,
    /// Whether the definition is valid
    pub valid: bool,
    /// Tool name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared parameters, by name
    pub parameters: Vec<ParameterSummary>,
    /// Validation error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Field the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Result of checking params against a tool.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckReport {
    /// Tool name
    pub tool: String,
    /// Whether the params are accepted
    pub valid: bool,
    /// Params with declared defaults filled in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<ToolParams>,
    /// Validation error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Parameter the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Runs the tool command.
///
/// # Errors
///
/// Returns an error if an input file cannot be read, the tool definition
/// used by `check` is invalid, or the report cannot be printed.
pub async fn run(
    action: ToolAction,
    validation: ValidationConfig,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    info!("Tool action: {:?}", action);

    match action {
        ToolAction::Validate { file, strict } => {
            let (report, code) = check_tool_file(&file, validation_config(validation, strict))?;
            print_report(&report, output_format)?;
            Ok(code)
        }
        ToolAction::Check {
            tool_file,
            params_file,
            strict,
        } => {
            let (report, code) =
                check_params_file(&tool_file, &params_file, validation_config(validation, strict))?;
            print_report(&report, output_format)?;
            Ok(code)
        }
    }
}

/// Validates the tool definition in `file`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not JSON.
pub fn check_tool_file(file: &Path, validation: ValidationConfig) -> Result<(ToolReport, ExitCode)> {
    let input = read_json(file)?;
    let file = file.display().to_string();

    match McpToolDefinition::from_json(&input, &validation) {
        Ok(tool) => {
            let parameters = tool
                .input_schema
                .properties
                .iter()
                .map(|(name, p)| ParameterSummary {
                    name: name.clone(),
                    param_type: p.param_type.to_string(),
                    required: tool.input_schema.is_required(name),
                    depth: p.depth(),
                })
                .collect();
            let report = ToolReport {
                file,
                valid: true,
                name: Some(tool.name.into_inner()),
                parameters,
                error: None,
                field: None,
            };
            Ok((report, ExitCode::SUCCESS))
        }
        Err(err) => {
            let report = ToolReport {
                file,
                valid: false,
                name: None,
                parameters: Vec::new(),
                error: Some(err.to_string()),
                field: err.field().map(str::to_string),
            };
            Ok((report, ExitCode::for_error(&err)))
        }
    }
}

/// Checks the params object in `params_file` against the tool in
/// `tool_file`.
///
/// # Errors
///
/// Returns an error if either file cannot be read, or if the tool
/// definition itself is invalid.
pub fn check_params_file(
    tool_file: &Path,
    params_file: &Path,
    validation: ValidationConfig,
) -> Result<(CheckReport, ExitCode)> {
    let tool = McpToolDefinition::from_json(&read_json(tool_file)?, &validation)?;
    let input = read_json(params_file)?;
    let params = input
        .as_object()
        .ok_or_else(|| type_mismatch("<params>", "object", &input))?;

    let outcome = validate_params(&tool, params, &validation);
    let code = outcome
        .as_ref()
        .map_or_else(ExitCode::for_error, |_| ExitCode::SUCCESS);

    let report = match outcome {
        Ok(()) => CheckReport {
            tool: tool.name.to_string(),
            valid: true,
            params: Some(with_defaults(&tool, params)),
            error: None,
            field: None,
        },
        Err(err) => failed_check(&tool, &err),
    };
    Ok((report, code))
}

fn failed_check(tool: &McpToolDefinition, err: &Error) -> CheckReport {
    CheckReport {
        tool: tool.name.to_string(),
        valid: false,
        params: None,
        error: Some(err.to_string()),
        field: err.field().map(str::to_string),
    }
}
