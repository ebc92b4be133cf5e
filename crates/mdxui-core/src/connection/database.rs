//! Registered database connections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use super::config::AdapterKind;
use super::status::{ConnectionEvent, ConnectionStatus};
use crate::{ConnectionId, DurableObjectId, Result};

/// Backend kind of a registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatabaseType {
    /// SQLite-compatible storage (including libSQL)
    Sqlite,
    /// Cloudflare D1
    D1,
    /// Durable Object embedded storage
    DurableObject,
    /// Any other externally hosted database
    External,
}

impl DatabaseType {
    /// Backend kind a connection registered through `adapter` reports.
    #[must_use]
    pub const fn for_adapter(adapter: AdapterKind) -> Self {
        match adapter {
            AdapterKind::Turso => Self::Sqlite,
            AdapterKind::D1 => Self::D1,
            AdapterKind::Supabase => Self::External,
        }
    }

    /// Returns the wire name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::D1 => "d1",
            Self::DurableObject => "durable-object",
            Self::External => "external",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A database connection as shown by the studio shell.
///
/// The status only changes through [`DatabaseConnection::apply`], which
/// enforces the lifecycle state machine.
///
/// # Examples
///
/// ```
/// use mdxui_core::connection::{ConnectionEvent, ConnectionStatus, DatabaseConnection, DatabaseType};
/// use mdxui_core::{ConnectionId, DurableObjectId};
///
/// let mut conn = DatabaseConnection::new(
///     ConnectionId::new("conn-123"),
///     "Production DB",
///     DatabaseType::Sqlite,
///     DurableObjectId::new("do-abc123"),
/// );
/// assert_eq!(conn.status, ConnectionStatus::Disconnected);
///
/// conn.apply(ConnectionEvent::ConnectAttempt)?;
/// conn.apply(ConnectionEvent::ConnectSuccess)?;
/// assert!(conn.is_connected());
/// assert!(conn.last_connected_at.is_some());
/// # Ok::<(), mdxui_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConnection {
    /// Connection id
    pub id: ConnectionId,
    /// Display name
    pub name: String,
    /// Backend kind
    #[serde(rename = "type")]
    pub db_type: DatabaseType,
    /// Lifecycle status
    pub status: ConnectionStatus,
    /// Host reference of the backing Durable Object
    pub durable_object_id: DurableObjectId,
    /// When the connection last reached `connected`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_connected_at: Option<DateTime<Utc>>,
    /// Database name reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    /// Hosting region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl DatabaseConnection {
    /// Creates a connection in the `disconnected` state.
    #[must_use]
    pub fn new(
        id: ConnectionId,
        name: impl Into<String>,
        db_type: DatabaseType,
        durable_object_id: DurableObjectId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            db_type,
            status: ConnectionStatus::Disconnected,
            durable_object_id,
            last_connected_at: None,
            database_name: None,
            region: None,
        }
    }

    /// Sets the database name.
    #[must_use]
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    /// Sets the hosting region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Applies a lifecycle event.
    ///
    /// Reaching `connected` stamps `last_connected_at`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidTransition`] and leaves the connection
    /// unchanged when the event is not allowed in the current status.
    pub fn apply(&mut self, event: ConnectionEvent) -> Result<ConnectionStatus> {
        let next = self.status.transition(event).inspect_err(|_| {
            warn!(
                connection = %self.id,
                status = %self.status,
                event = %event,
                "rejected connection transition"
            );
        })?;

        info!(connection = %self.id, from = %self.status, to = %next, "connection status changed");
        self.status = next;
        if next == ConnectionStatus::Connected {
            self.last_connected_at = Some(Utc::now());
        }
        Ok(next)
    }

    /// Returns `true` if the connection is usable.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}
