//! Validation of tool call parameters against a tool's input schema.
//!
//! # Examples
//!
//! ```
//! use mdxui_core::ValidationConfig;
//! use mdxui_mcp::params::validate_params;
//! use mdxui_mcp::tool::{McpToolDefinition, McpToolParameter};
//! use serde_json::json;
//!
//! let tool = McpToolDefinition::new("database_query", "Run SQL")
//!     .with_parameter("sql", McpToolParameter::string(), true);
//!
//! let ok = json!({"sql": "SELECT 1"});
//! assert!(validate_params(&tool, ok.as_object().unwrap(), &ValidationConfig::default()).is_ok());
//!
//! let missing = json!({});
//! let err = validate_params(&tool, missing.as_object().unwrap(), &ValidationConfig::default())
//!     .unwrap_err();
//! assert!(err.is_missing_field());
//! ```

use mdxui_core::validation::type_mismatch;
use mdxui_core::{Error, Result, UnknownFieldPolicy, ValidationConfig};
use serde_json::{Map, Value};

use crate::tool::{McpToolDefinition, McpToolParameter, ParameterType};

/// Checks `params` against the input schema of `tool`.
///
/// `null` counts as absent. Required parameters are checked first, then
/// every supplied value in key order.
///
/// # Errors
///
/// - [`Error::MissingField`] for an absent required parameter
/// - [`Error::TypeMismatch`] for a value of the wrong JSON type
/// - [`Error::ValidationError`] for a value outside its `enum`, or an
///   undeclared parameter under [`UnknownFieldPolicy::Reject`]
/// - [`Error::RecursionLimit`] for arrays nested deeper than
///   `config.max_parameter_depth`
pub fn validate_params(
    tool: &McpToolDefinition,
    params: &Map<String, Value>,
    config: &ValidationConfig,
) -> Result<()> {
    let schema = &tool.input_schema;

    if let Some(missing) = schema
        .required
        .iter()
        .find(|name| params.get(name.as_str()).is_none_or(Value::is_null))
    {
        return Err(Error::MissingField {
            field: missing.clone(),
        });
    }

    for (name, value) in params {
        if value.is_null() {
            continue;
        }
        match schema.properties.get(name) {
            Some(parameter) => check_value(parameter, value, name, 1, config)?,
            None if config.unknown_fields == UnknownFieldPolicy::Reject => {
                return Err(Error::ValidationError {
                    field: name.clone(),
                    reason: format!("unknown parameter for tool {}", tool.name),
                });
            }
            None => {}
        }
    }

    Ok(())
}

/// Checks one value against one parameter.
///
/// `level` is the nesting level of `parameter`, 1 for a top-level parameter.
pub(crate) fn check_value(
    parameter: &McpToolParameter,
    value: &Value,
    path: &str,
    level: usize,
    config: &ValidationConfig,
) -> Result<()> {
    if level > config.max_parameter_depth {
        return Err(Error::RecursionLimit {
            field: path.to_string(),
            limit: config.max_parameter_depth,
        });
    }

    if !parameter.param_type.matches(value) {
        return Err(type_mismatch(path, parameter.param_type.as_str(), value));
    }

    if let (Some(allowed), Value::String(s)) = (&parameter.enum_values, value)
        && !allowed.iter().any(|a| a == s)
    {
        return Err(Error::ValidationError {
            field: path.to_string(),
            reason: format!("'{s}' is not one of: {}", allowed.join(", ")),
        });
    }

    if parameter.param_type == ParameterType::Array
        && let (Some(items), Value::Array(elements)) = (parameter.items.as_deref(), value)
    {
        for (i, element) in elements.iter().enumerate() {
            check_value(items, element, &format!("{path}[{i}]"), level + 1, config)?;
        }
    }

    Ok(())
}

/// Returns `params` with every omitted parameter that has a default filled in.
#[must_use]
pub fn with_defaults(tool: &McpToolDefinition, params: &Map<String, Value>) -> Map<String, Value> {
    let mut filled = params.clone();
    for (name, default) in tool.defaults() {
        match filled.get(&name) {
            Some(v) if !v.is_null() => {}
            _ => {
                filled.insert(name, default);
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query_tool() -> McpToolDefinition {
        McpToolDefinition::new("database_query", "Execute a SQL query")
            .with_parameter("sql", McpToolParameter::string(), true)
            .with_parameter("connectionId", McpToolParameter::string(), true)
            .with_parameter(
                "format",
                McpToolParameter::string()
                    .with_enum(["rows", "csv"])
                    .with_default(json!("rows")),
                false,
            )
            .with_parameter("limit", McpToolParameter::number(), false)
            .with_parameter("tags", McpToolParameter::array(McpToolParameter::string()), false)
    }

    fn check(params: &Value, config: &ValidationConfig) -> Result<()> {
        validate_params(&query_tool(), params.as_object().unwrap(), config)
    }

    fn lenient() -> ValidationConfig {
        ValidationConfig::default()
    }

    #[test]
    fn test_valid_params() {
        let params = json!({
            "sql": "SELECT * FROM users",
            "connectionId": "conn-1",
            "format": "csv",
            "limit": 10,
            "tags": ["a", "b"]
        });
        assert!(check(&params, &lenient()).is_ok());
    }

    #[test]
    fn test_missing_required() {
        let err = check(&json!({"sql": "SELECT 1"}), &lenient()).unwrap_err();
        assert!(err.is_missing_field());
        assert_eq!(err.field(), Some("connectionId"));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let err = check(&json!({"sql": "SELECT 1", "connectionId": null}), &lenient()).unwrap_err();
        assert!(err.is_missing_field());

        let params = json!({"sql": "SELECT 1", "connectionId": "c", "limit": null});
        assert!(check(&params, &lenient()).is_ok());
    }

    #[test]
    fn test_wrong_type() {
        let err = check(&json!({"sql": 42, "connectionId": "c"}), &lenient()).unwrap_err();
        match err {
            Error::TypeMismatch {
                field,
                expected,
                found,
            } => {
                assert_eq!(field, "sql");
                assert_eq!(expected, "string");
                assert_eq!(found, "number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_enum_membership() {
        let err = check(
            &json!({"sql": "x", "connectionId": "c", "format": "xml"}),
            &lenient(),
        )
        .unwrap_err();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("rows, csv"));
    }

    #[test]
    fn test_array_items_are_checked() {
        let ok = json!({"sql": "x", "connectionId": "c", "tags": ["a", "b"]});
        assert!(check(&ok, &lenient()).is_ok());

        let bad = json!({"sql": "x", "connectionId": "c", "tags": [1, 2]});
        let err = check(&bad, &lenient()).unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(err.field(), Some("tags[0]"));
    }

    #[test]
    fn test_unknown_params_follow_policy() {
        let params = json!({"sql": "x", "connectionId": "c", "dryRun": true});
        assert!(check(&params, &lenient()).is_ok());

        let strict = ValidationConfig {
            unknown_fields: UnknownFieldPolicy::Reject,
            ..ValidationConfig::default()
        };
        let err = check(&params, &strict).unwrap_err();
        assert_eq!(err.field(), Some("dryRun"));
    }

    #[test]
    fn test_value_depth_limit() {
        let grid = McpToolParameter::array(McpToolParameter::array(McpToolParameter::number()));
        let tool = McpToolDefinition::new("grid", "2-D grid").with_parameter("cells", grid, true);
        let params = json!({"cells": [[1, 2], [3]]});
        let params = params.as_object().unwrap();

        assert!(validate_params(&tool, params, &lenient()).is_ok());

        let shallow = ValidationConfig {
            max_parameter_depth: 2,
            ..ValidationConfig::default()
        };
        let err = validate_params(&tool, params, &shallow).unwrap_err();
        assert!(err.is_recursion_limit());
        assert_eq!(err.field(), Some("cells[0][0]"));
    }

    #[test]
    fn test_with_defaults() {
        let params = json!({"sql": "x", "format": null});
        let filled = with_defaults(&query_tool(), params.as_object().unwrap());
        assert_eq!(filled["format"], "rows");
        assert_eq!(filled["sql"], "x");

        let params = json!({"format": "csv"});
        let filled = with_defaults(&query_tool(), params.as_object().unwrap());
        assert_eq!(filled["format"], "csv");
    }
}
