//! Action type definitions for CLI commands.

use clap::Subcommand;
use mdxui_core::connection::{ConnectionEvent, ConnectionStatus};
use std::path::PathBuf;

/// Connection config actions.
#[derive(Subcommand, Debug)]
pub enum ConnectionAction {
    /// Validate a connection config JSON file
    Validate {
        /// Path to the config file
        file: PathBuf,

        /// Reject fields the adapter does not declare
        #[arg(long)]
        strict: bool,
    },

    /// Apply one event to a connection status
    Transition {
        /// Current status (connected, disconnected, connecting, error)
        #[arg(long)]
        from: ConnectionStatus,

        /// Event (connect-attempt, connect-success, connect-failure, disconnect, retry)
        #[arg(long)]
        event: ConnectionEvent,
    },
}

/// MCP tool actions.
#[derive(Subcommand, Debug)]
pub enum ToolAction {
    /// Validate a tool definition JSON file
    Validate {
        /// Path to the tool definition
        file: PathBuf,

        /// Reject fields the schema does not declare
        #[arg(long)]
        strict: bool,
    },

    /// Check a params JSON file against a tool definition
    Check {
        /// Path to the tool definition
        tool_file: PathBuf,

        /// Path to the params object
        params_file: PathBuf,

        /// Reject undeclared fields and parameters
        #[arg(long)]
        strict: bool,
    },
}

/// Configuration management actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}
