//! Connection command implementation.
//!
//! Validates connection config files and steps the connection status
//! machine.

use crate::ConnectionAction;
use crate::commands::common::{print_report, read_json, validation_config};
use anyhow::Result;
use mdxui_core::cli::{ExitCode, OutputFormat};
use mdxui_core::connection::{
    ConnectionEvent, ConnectionStatus, DatabaseType, validate_connection_config,
};
use mdxui_core::{Error, ValidationConfig};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Result of validating a connection config.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigReport {
    /// Path of the checked file
    pub file: String,
    /// Whether the config is valid
    pub valid: bool,
    /// Adapter kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
    /// Database type the adapter maps to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_type: Option<String>,
    /// Endpoint, without credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Validation error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Field the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Result of applying an event to a status.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TransitionReport {
    /// Starting status
    pub from: ConnectionStatus,
    /// Applied event
    pub event: ConnectionEvent,
    /// Resulting status, if the transition is allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<ConnectionStatus>,
    /// Events accepted in `from`
    pub allowed_events: Vec<ConnectionEvent>,
    /// Rejection message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the connection command.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or the report cannot be
/// printed.
pub async fn run(
    action: ConnectionAction,
    validation: ValidationConfig,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    info!("Connection action: {:?}", action);

    match action {
        ConnectionAction::Validate { file, strict } => {
            let (report, code) = check_config_file(&file, validation_config(validation, strict))?;
            print_report(&report, output_format)?;
            Ok(code)
        }
        ConnectionAction::Transition { from, event } => {
            let (report, code) = transition(from, event);
            print_report(&report, output_format)?;
            Ok(code)
        }
    }
}

/// Validates the connection config in `file`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not JSON. Validation
/// failures are part of the report.
pub fn check_config_file(file: &Path, validation: ValidationConfig) -> Result<(ConfigReport, ExitCode)> {
    let input = read_json(file)?;
    let mut report = ConfigReport {
        file: file.display().to_string(),
        valid: false,
        adapter: None,
        database_type: None,
        endpoint: None,
        error: None,
        field: None,
    };

    match validate_connection_config(&input, validation.unknown_fields) {
        Ok(config) => {
            let adapter = config.adapter();
            report.valid = true;
            report.adapter = Some(adapter.to_string());
            report.database_type = Some(DatabaseType::for_adapter(adapter).to_string());
            report.endpoint = Some(config.endpoint());
            Ok((report, ExitCode::SUCCESS))
        }
        Err(err) => {
            let code = ExitCode::for_error(&err);
            fill_error(&mut report, &err);
            Ok((report, code))
        }
    }
}

fn fill_error(report: &mut ConfigReport, err: &Error) {
    report.field = err.field().map(str::to_string);
    report.error = Some(err.to_string());
}

/// Applies `event` to `from`.
#[must_use]
pub fn transition(from: ConnectionStatus, event: ConnectionEvent) -> (TransitionReport, ExitCode) {
    let outcome = from.transition(event);
    let code = outcome
        .as_ref()
        .map_or_else(ExitCode::for_error, |_| ExitCode::SUCCESS);

    let report = TransitionReport {
        from,
        event,
        allowed_events: from.allowed_events().to_vec(),
        to: outcome.as_ref().ok().copied(),
        error: outcome.err().map(|e| e.to_string()),
    };
    (report, code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdxui_core::UnknownFieldPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_turso_config() {
        let file = write_json(r#"{"adapter": "turso", "url": "libsql://db.turso.io", "authToken": "t"}"#);
        let (report, code) = check_config_file(file.path(), ValidationConfig::default()).unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(report.valid);
        assert_eq!(report.adapter.as_deref(), Some("turso"));
        assert_eq!(report.database_type.as_deref(), Some("sqlite"));
        assert_eq!(report.endpoint.as_deref(), Some("libsql://db.turso.io"));
    }

    #[test]
    fn test_missing_field_is_reported() {
        let file = write_json(r#"{"adapter": "d1", "databaseId": "db"}"#);
        let (report, code) = check_config_file(file.path(), ValidationConfig::default()).unwrap();

        assert_eq!(code, ExitCode::VALIDATION_FAILED);
        assert!(!report.valid);
        assert!(report.field.is_some());
        assert!(report.error.unwrap().contains("Missing required field"));
    }

    #[test]
    fn test_strict_rejects_unknown_fields() {
        let file = write_json(
            r#"{"adapter": "supabase", "projectUrl": "https://p.supabase.co", "anonKey": "k", "pool": 5}"#,
        );
        let lenient = ValidationConfig::default();
        let strict = ValidationConfig {
            unknown_fields: UnknownFieldPolicy::Reject,
            ..lenient
        };

        assert!(check_config_file(file.path(), lenient).unwrap().0.valid);

        let (report, code) = check_config_file(file.path(), strict).unwrap();
        assert_eq!(code, ExitCode::VALIDATION_FAILED);
        assert_eq!(report.field.as_deref(), Some("pool"));
    }

    #[test]
    fn test_transition_allowed() {
        let (report, code) = transition(ConnectionStatus::Disconnected, ConnectionEvent::ConnectAttempt);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(report.to, Some(ConnectionStatus::Connecting));
        assert!(report.error.is_none());
    }

    #[test]
    fn test_transition_rejected() {
        let (report, code) = transition(ConnectionStatus::Connected, ConnectionEvent::Retry);
        assert_eq!(code, ExitCode::VALIDATION_FAILED);
        assert!(report.to.is_none());
        assert_eq!(report.allowed_events, [ConnectionEvent::Disconnect]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["from"], "connected");
        assert_eq!(json["event"], "retry");
    }
}
