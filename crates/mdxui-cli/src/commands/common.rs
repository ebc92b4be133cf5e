//! Common utilities shared across CLI commands.

use anyhow::{Context, Result};
use mdxui_core::cli::{ExitCode, OutputFormat};
use mdxui_core::{Error, UnknownFieldPolicy, ValidationConfig};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads and parses a JSON file.
///
/// Failures carry an [`Error`] so [`exit_code_for`] can tell unreadable
/// input apart from other errors.
///
/// # Examples
///
/// ```
/// use mdxui_cli::commands::common::read_json;
/// use std::io::Write;
///
/// let mut file = tempfile::NamedTempFile::new()?;
/// write!(file, r#"{{"adapter": "turso"}}"#)?;
///
/// let value = read_json(file.path())?;
/// assert_eq!(value["adapter"], "turso");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn read_json(path: &Path) -> Result<Value> {
    debug!("Reading {}", path.display());
    let content = fs::read_to_string(path)
        .map_err(|e| Error::InvalidArgument(format!("cannot read {}: {e}", path.display())))?;
    let value = serde_json::from_str(&content)
        .map_err(Error::from)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(value)
}

/// Validation settings for a command: the configured ones, with `--strict`
/// forcing [`UnknownFieldPolicy::Reject`].
#[must_use]
pub const fn validation_config(base: ValidationConfig, strict: bool) -> ValidationConfig {
    if strict {
        ValidationConfig {
            unknown_fields: UnknownFieldPolicy::Reject,
            max_parameter_depth: base.max_parameter_depth,
        }
    } else {
        base
    }
}

/// Formats `report` and prints it to stdout.
pub fn print_report<T: Serialize>(report: &T, output_format: OutputFormat) -> Result<()> {
    let formatted = crate::formatters::format_output(report, output_format)
        .context("failed to format report")?;
    println!("{formatted}");
    Ok(())
}

/// Exit code for an error that escaped a command.
///
/// Uses the first [`Error`] in the chain; anything else is
/// [`ExitCode::ERROR`].
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map_or(ExitCode::ERROR, ExitCode::for_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_json_missing_file_is_invalid_input() {
        let err = read_json(Path::new("/nonexistent/mdxui/config.json")).unwrap_err();
        assert_eq!(exit_code_for(&err), ExitCode::INVALID_INPUT);
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_read_json_malformed_is_invalid_input() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"adapter\": ").unwrap();

        let err = read_json(file.path()).unwrap_err();
        assert_eq!(exit_code_for(&err), ExitCode::INVALID_INPUT);
        assert!(err.to_string().contains("is not valid JSON"));
    }

    #[test]
    fn test_exit_code_for_foreign_error() {
        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(exit_code_for(&err), ExitCode::ERROR);
    }

    #[test]
    fn test_strict_overrides_policy() {
        let base = ValidationConfig::default();
        assert_eq!(validation_config(base, false), base);

        let strict = validation_config(base, true);
        assert_eq!(strict.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(strict.max_parameter_depth, base.max_parameter_depth);
    }
}
