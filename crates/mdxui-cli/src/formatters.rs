//! Output formatters for CLI commands.
//!
//! Every report is serialized once to a [`serde_json::Value`] and rendered
//! from there, so all commands format the same way.

use anyhow::Result;
use colored::Colorize;
use mdxui_core::cli::OutputFormat;
use serde::Serialize;

/// Format data according to the specified output format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Examples
///
/// ```
/// use mdxui_cli::formatters::format_output;
/// use mdxui_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Report {
///     valid: bool,
///     adapter: String,
/// }
///
/// let report = Report { valid: true, adapter: "turso".to_string() };
///
/// let output = format_output(&report, OutputFormat::Json)?;
/// assert!(output.contains("\"adapter\""));
///
/// let output = format_output(&report, OutputFormat::Text)?;
/// assert!(output.contains("adapter: turso"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Format data as JSON with 2-space indentation.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let json = serde_json::to_string_pretty(data)?;
        Ok(json)
    }
}

/// Plain text output formatting.
///
/// One `path: value` line per scalar, with nested keys joined by `.` and
/// array elements indexed as `[i]`. Suitable for `grep` and `cut`.
pub mod text {
    use super::{Result, Serialize};
    use serde_json::Value;

    /// Format data as `path: value` lines.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut lines = Vec::new();
        flatten(&value, String::new(), &mut lines);
        Ok(lines.join("\n"))
    }

    fn flatten(value: &Value, path: String, lines: &mut Vec<String>) {
        match value {
            Value::Object(obj) if !obj.is_empty() => {
                for (key, val) in obj {
                    let child = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    flatten(val, child, lines);
                }
            }
            Value::Array(arr) if !arr.is_empty() => {
                for (i, item) in arr.iter().enumerate() {
                    flatten(item, format!("{path}[{i}]"), lines);
                }
            }
            Value::String(s) => lines.push(line(&path, s)),
            other => lines.push(line(&path, &other.to_string())),
        }
    }

    fn line(path: &str, value: &str) -> String {
        if path.is_empty() {
            value.to_string()
        } else {
            format!("{path}: {value}")
        }
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{Colorize, Result, Serialize};
    use serde_json::Value;

    /// Format data as colorized, indented output.
    ///
    /// A top-level `valid` or `success` flag is shown as a ✓ / ✗ banner
    /// above the details.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;

        let banner = value
            .get("valid")
            .or_else(|| value.get("success"))
            .and_then(Value::as_bool)
            .map(|ok| {
                if ok {
                    format!("{}\n", "✓ ok".green().bold())
                } else {
                    format!("{}\n", "✗ failed".red().bold())
                }
            })
            .unwrap_or_default();

        Ok(format!("{banner}{}", format_value(&value, 0)))
    }

    fn format_value(value: &Value, indent: usize) -> String {
        let indent_str = "  ".repeat(indent);
        let next_indent_str = "  ".repeat(indent + 1);

        match value {
            Value::Null => "null".dimmed().to_string(),
            Value::Bool(b) => b.to_string().yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => format!("\"{}\"", s.green()),
            Value::Array(arr) if arr.is_empty() => "[]".to_string(),
            Value::Object(obj) if obj.is_empty() => "{}".to_string(),
            Value::Array(arr) => {
                let items: Vec<String> = arr
                    .iter()
                    .map(|item| format!("{next_indent_str}{}", format_value(item, indent + 1)))
                    .collect();
                format!("[\n{}\n{indent_str}]", items.join(",\n"))
            }
            Value::Object(obj) => {
                let entries: Vec<String> = obj
                    .iter()
                    .map(|(key, val)| {
                        format!(
                            "{next_indent_str}{}: {}",
                            key.blue().bold(),
                            format_value(val, indent + 1)
                        )
                    })
                    .collect();
                format!("{{\n{}\n{indent_str}}}", entries.join(",\n"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Parameter {
        name: String,
        required: bool,
    }

    #[derive(Serialize)]
    struct Report {
        valid: bool,
        tool: String,
        parameters: Vec<Parameter>,
        error: Option<String>,
    }

    fn report(valid: bool) -> Report {
        Report {
            valid,
            tool: "database_query".to_string(),
            parameters: vec![
                Parameter {
                    name: "sql".to_string(),
                    required: true,
                },
                Parameter {
                    name: "limit".to_string(),
                    required: false,
                },
            ],
            error: None,
        }
    }

    #[test]
    fn test_json_format() {
        let output = json::format(&report(true)).unwrap();
        let back: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(back["parameters"][1]["name"], "limit");
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_text_format_flattens_paths() {
        let output = text::format(&report(true)).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines.contains(&"valid: true"));
        assert!(lines.contains(&"tool: database_query"));
        assert!(lines.contains(&"parameters[0].name: sql"));
        assert!(lines.contains(&"parameters[1].required: false"));
        assert!(lines.contains(&"error: null"));
    }

    #[test]
    fn test_text_format_scalar_root() {
        assert_eq!(text::format(&"plain").unwrap(), "plain");
        assert_eq!(text::format(&serde_json::json!({"empty": []})).unwrap(), "empty: []");
    }

    #[test]
    fn test_pretty_format_banner() {
        colored::control::set_override(false);

        let ok = pretty::format(&report(true)).unwrap();
        assert!(ok.starts_with("✓ ok"));
        assert!(ok.contains("database_query"));

        let failed = pretty::format(&report(false)).unwrap();
        assert!(failed.starts_with("✗ failed"));

        let no_flag = pretty::format(&serde_json::json!({"path": "/tmp"})).unwrap();
        assert!(no_flag.starts_with('{'));
    }

    #[test]
    fn test_format_output_dispatch() {
        let data = report(true);
        assert!(format_output(&data, OutputFormat::Json).unwrap().contains("\"tool\""));
        assert!(format_output(&data, OutputFormat::Text).unwrap().contains("tool: database_query"));
        assert!(format_output(&data, OutputFormat::Pretty).unwrap().contains("tool"));
    }
}
