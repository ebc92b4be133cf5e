//! Core data contracts for the mdxui database studio.
//!
//! This crate holds the types every studio front end and host share:
//!
//! - [`connection`]: adapter configs and their validator, the connection
//!   status state machine, the connection registry and the handler trait
//! - [`schema`]: introspected tables, columns, indexes and foreign keys
//! - [`query`]: query pane state, history, the autocomplete schema and
//!   result pagination
//! - [`props`]: serializable props of the connection, schema, query editor
//!   and results grid components
//! - [`cli`]: output formats and exit codes for command-line front ends
//!
//! Errors are reported through a single [`Error`] enum. Validation never
//! panics; it returns the offending field.
//!
//! # Examples
//!
//! ```
//! use mdxui_core::connection::{validate_connection_config, ConnectionStatus, ConnectionEvent};
//! use mdxui_core::UnknownFieldPolicy;
//! use serde_json::json;
//!
//! let config = validate_connection_config(
//!     &json!({"adapter": "supabase", "projectUrl": "https://p.supabase.co", "anonKey": "k"}),
//!     UnknownFieldPolicy::Ignore,
//! )?;
//! assert_eq!(config.as_supabase().unwrap().schema, "public");
//!
//! let status = ConnectionStatus::default().transition(ConnectionEvent::ConnectAttempt)?;
//! assert_eq!(status, ConnectionStatus::Connecting);
//! # Ok::<(), mdxui_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod types;

pub mod cli;
pub mod connection;
pub mod props;
pub mod query;
pub mod schema;
pub mod validation;

pub use config::{
    DEFAULT_MAX_PARAMETER_DEPTH, RuntimeConfig, RuntimeConfigBuilder, UnknownFieldPolicy,
    ValidationConfig,
};
pub use error::{Error, Result};
pub use types::{ConnectionId, DurableObjectId, InvocationId, ToolName};
