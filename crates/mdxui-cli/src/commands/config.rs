//! Config command implementation.
//!
//! Manages the CLI configuration file.
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/mdxui/config.toml`
//! - macOS: `~/Library/Application Support/mdxui/config.toml`
//! - Windows: `%APPDATA%\mdxui\config.toml`

use crate::ConfigAction;
use crate::commands::common::print_report;
use anyhow::{Context, Result};
use mdxui_core::ValidationConfig;
use mdxui_core::cli::{ExitCode, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Log levels accepted in `general.log_level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// CLI configuration.
///
/// # Examples
///
/// ```toml
/// [general]
/// default_format = "pretty"
/// log_level = "warn"
///
/// [validation]
/// unknown_fields = "ignore"
/// max_parameter_depth = 16
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// General configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format (json, text, pretty)
    pub default_format: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::default().to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range.
    pub fn validate(&self) -> Result<()> {
        self.output_format()?;

        if !LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            anyhow::bail!(
                "invalid log_level '{}', must be one of: {}",
                self.general.log_level,
                LOG_LEVELS.join(", ")
            );
        }

        if self.validation.max_parameter_depth == 0 {
            anyhow::bail!("validation.max_parameter_depth must be greater than 0");
        }

        Ok(())
    }

    /// The configured default output format.
    ///
    /// # Errors
    ///
    /// Returns an error if `general.default_format` is not a known format.
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.general
            .default_format
            .parse()
            .with_context(|| format!("invalid default_format '{}'", self.general.default_format))
    }
}

/// Returns the configuration file path.
///
/// # Errors
///
/// Returns an error if the platform has no config directory.
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("failed to determine config directory")?;
    Ok(config_dir.join("mdxui").join("config.toml"))
}

/// Loads the configuration file, or defaults if there is none.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed or
/// validated.
pub fn load_config() -> Result<Config> {
    load_from(&config_path()?)
}

/// Loads the configuration from `path`, or defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed or
/// validated.
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("Config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).context("failed to read config file")?;
    let config: Config = toml::from_str(&content).context("failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

/// Writes `config` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the config is invalid or cannot be written.
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    let toml_str = toml::to_string_pretty(config).context("failed to serialize config")?;
    fs::write(path, toml_str).context("failed to write config file")?;

    debug!("Saved config to {}", path.display());
    Ok(())
}

/// Initialization result.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InitResult {
    /// Whether a file was written
    pub success: bool,
    /// Status message
    pub message: String,
    /// Config file path
    pub path: String,
}

/// Config file location.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PathResult {
    /// Config file path
    pub path: String,
    /// Whether the file exists
    pub exists: bool,
}

/// Runs the config command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read or written.
pub async fn run(action: ConfigAction, output_format: OutputFormat) -> Result<ExitCode> {
    info!("Config action: {:?}", action);

    let path = config_path()?;
    match action {
        ConfigAction::Show => {
            let config = load_from(&path)?;
            print_report(&config, output_format)?;
        }
        ConfigAction::Init { force } => {
            let result = init_at(&path, force)?;
            print_report(&result, output_format)?;
        }
        ConfigAction::Path => {
            let result = PathResult {
                path: path.display().to_string(),
                exists: path.exists(),
            };
            print_report(&result, output_format)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Writes a default configuration to `path`.
///
/// An existing file is kept unless `force` is set.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn init_at(path: &Path, force: bool) -> Result<InitResult> {
    let display = path.display().to_string();

    if path.exists() && !force {
        return Ok(InitResult {
            success: false,
            message: "configuration file already exists (use --force to overwrite)".to_string(),
            path: display,
        });
    }

    save_to(&Config::default(), path)?;
    Ok(InitResult {
        success: true,
        message: "configuration file created with default values".to_string(),
        path: display,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdxui_core::UnknownFieldPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output_format().unwrap(), OutputFormat::Pretty);
        assert_eq!(config.validation, ValidationConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.general.default_format = "yaml".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.validation.max_parameter_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[validation]\nunknown_fields = \"reject\"\n").unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.validation.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(config.validation.max_parameter_depth, 16);
        assert_eq!(config.general, GeneralConfig::default());
    }

    #[test]
    fn test_init_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = init_at(&path, false).unwrap();
        assert!(first.success);
        assert_eq!(load_from(&path).unwrap(), Config::default());

        let second = init_at(&path, false).unwrap();
        assert!(!second.success);

        let forced = init_at(&path, true).unwrap();
        assert!(forced.success);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
