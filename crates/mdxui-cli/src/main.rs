//! mdxui studio CLI.
//!
//! Checks studio inputs from the command line, the same way the studio
//! validates them at runtime.
//!
//! # Architecture
//!
//! The CLI is organized around subcommands:
//! - `connection` - Validate connection configs and step the status machine
//! - `tool` - Validate MCP tool definitions and check parameters
//! - `config` - Manage the CLI configuration file
//! - `completions` - Generate shell completions
//!
//! # Examples
//!
//! ```bash
//! # Validate a Turso connection config
//! mdxui connection validate turso.json
//!
//! # Check params against a tool, failing on undeclared params
//! mdxui tool check query-tool.json params.json --strict
//!
//! # Which events are legal while connecting?
//! mdxui --format text connection transition --from connecting --event retry
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use mdxui_cli::commands::{self, common::exit_code_for, config::Config};
use mdxui_cli::{ConfigAction, ConnectionAction, ToolAction};
use mdxui_core::cli::{ExitCode, OutputFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// mdxui studio - check connection configs and MCP tool contracts.
#[derive(Parser, Debug)]
#[command(name = "mdxui")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty); defaults to the configured format
    #[arg(long = "format", global = true)]
    format: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "MDXUI_LOG_JSON")]
    log_json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate connection configs and step the status machine.
    Connection {
        /// Connection action
        #[command(subcommand)]
        action: ConnectionAction,
    },

    /// Validate MCP tool definitions and check parameters.
    Tool {
        /// Tool action
        #[command(subcommand)]
        action: ToolAction,
    },

    /// Manage the CLI configuration file.
    Config {
        /// Configuration action
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Broken config falls back to defaults so `config init --force` can still run.
    let (config, config_error) = match commands::config::load_config() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_logging(cli.verbose, cli.log_json, &config.general.log_level)?;
    if let Some(e) = config_error {
        tracing::warn!("Ignoring configuration file: {e:#}");
    }

    let exit_code = match resolve_format(cli.format.as_deref(), &config) {
        Ok(output_format) => execute_command(cli.command, &config, output_format).await,
        Err(e) => Err(e),
    }
    .unwrap_or_else(|e| {
        eprintln!("{} {e:#}", "error:".red().bold());
        exit_code_for(&e)
    });

    std::process::exit(exit_code.as_i32());
}

/// Output format from `--format`, falling back to the configured default.
fn resolve_format(flag: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(format) => Ok(format.parse::<OutputFormat>()?),
        None => config.output_format(),
    }
}

/// Initializes logging to stderr.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` wins over the
/// configured level.
fn init_logging(verbose: bool, json: bool, configured_level: &str) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured_level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

/// Routes commands to their handlers.
async fn execute_command(
    command: Commands,
    config: &Config,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    match command {
        Commands::Connection { action } => {
            commands::connection::run(action, config.validation, output_format).await
        }
        Commands::Tool { action } => {
            commands::tool::run(action, config.validation, output_format).await
        }
        Commands::Config { action } => commands::config::run(action, output_format).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdxui_core::connection::{ConnectionEvent, ConnectionStatus};
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parsing_connection_validate() {
        let cli = Cli::parse_from(["mdxui", "connection", "validate", "turso.json", "--strict"]);
        if let Commands::Connection {
            action: ConnectionAction::Validate { file, strict },
        } = cli.command
        {
            assert_eq!(file, PathBuf::from("turso.json"));
            assert!(strict);
        } else {
            panic!("Expected connection validate command");
        }
    }

    #[test]
    fn test_cli_parsing_transition() {
        let cli = Cli::parse_from([
            "mdxui",
            "connection",
            "transition",
            "--from",
            "error",
            "--event",
            "retry",
        ]);
        if let Commands::Connection {
            action: ConnectionAction::Transition { from, event },
        } = cli.command
        {
            assert_eq!(from, ConnectionStatus::Error);
            assert_eq!(event, ConnectionEvent::Retry);
        } else {
            panic!("Expected connection transition command");
        }
    }

    #[test]
    fn test_cli_rejects_unknown_status() {
        let result = Cli::try_parse_from([
            "mdxui",
            "connection",
            "transition",
            "--from",
            "sleeping",
            "--event",
            "retry",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_tool_check() {
        let cli = Cli::parse_from(["mdxui", "tool", "check", "tool.json", "params.json"]);
        if let Commands::Tool {
            action:
                ToolAction::Check {
                    tool_file,
                    params_file,
                    strict,
                },
        } = cli.command
        {
            assert_eq!(tool_file, PathBuf::from("tool.json"));
            assert_eq!(params_file, PathBuf::from("params.json"));
            assert!(!strict);
        } else {
            panic!("Expected tool check command");
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["mdxui", "config", "show", "--verbose", "--format", "json"]);
        assert!(cli.verbose);
        assert_eq!(cli.format.as_deref(), Some("json"));

        let cli = Cli::parse_from(["mdxui", "config", "path"]);
        assert!(cli.format.is_none());
    }

    #[test]
    fn test_cli_parsing_config_init_force() {
        let cli = Cli::parse_from(["mdxui", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[test]
    fn test_cli_parsing_completions_zsh() {
        let cli = Cli::parse_from(["mdxui", "completions", "zsh"]);
        if let Commands::Completions { shell } = cli.command {
            assert_eq!(shell, Shell::Zsh);
        } else {
            panic!("Expected Completions command");
        }
    }

    #[test]
    fn test_resolve_format() {
        let config = Config::default();
        assert_eq!(resolve_format(None, &config).unwrap(), OutputFormat::Pretty);
        assert_eq!(resolve_format(Some("text"), &config).unwrap(), OutputFormat::Text);
        assert!(resolve_format(Some("yaml"), &config).is_err());
    }
}
