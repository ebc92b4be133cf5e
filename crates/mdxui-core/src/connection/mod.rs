//! Database connection contracts.
//!
//! - [`ConnectionConfig`]: adapter-tagged configuration, validated from
//!   untrusted JSON by [`validate_connection_config`]
//! - [`ConnectionStatus`] and [`ConnectionEvent`]: the lifecycle state machine
//! - [`DatabaseConnection`] and [`ConnectionRegistry`]: the connections a
//!   studio shell knows about
//! - [`ConnectionHandler`] and [`test_connection`]: the host collaborator

mod config;
mod database;
mod handler;
mod registry;
mod status;
mod test_result;
mod validate;

pub use config::{
    AdapterKind, ConnectionConfig, D1ConnectionConfig, DEFAULT_SUPABASE_SCHEMA,
    SupabaseConnectionConfig, TursoConnectionConfig,
};
pub use database::{DatabaseConnection, DatabaseType};
pub use handler::{ConnectionHandler, test_connection};
pub use registry::{ConnectionRegistry, RegisteredConnection};
pub use status::{ConnectionEvent, ConnectionStatus};
pub use test_result::TestResult;
pub use validate::validate_connection_config;
