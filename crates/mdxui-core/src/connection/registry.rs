//! In-memory registry of configured connections.
//!
//! The registry owns every [`DatabaseConnection`] the shell knows about,
//! together with the validated config it was created from, and tracks which
//! one is active. Status changes go through the state machine; the handler
//! helpers wrap a [`ConnectionHandler`] call in the matching events.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::ConnectionConfig;
use super::database::{DatabaseConnection, DatabaseType};
use super::handler::{ConnectionHandler, test_connection};
use super::status::{ConnectionEvent, ConnectionStatus};
use super::test_result::TestResult;
use super::validate::validate_connection_config;
use crate::{ConnectionId, DurableObjectId, Error, Result, RuntimeConfig, ValidationConfig};

/// A connection together with the config it was registered from.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredConnection {
    /// Runtime view of the connection
    pub connection: DatabaseConnection,
    /// Validated adapter config
    pub config: ConnectionConfig,
}

/// Ordered collection of connections with an optional active selection.
///
/// # Examples
///
/// ```
/// use mdxui_core::connection::{ConnectionEvent, ConnectionRegistry, ConnectionStatus};
/// use serde_json::json;
///
/// let mut registry = ConnectionRegistry::new();
/// let id = registry
///     .register("Edge", &json!({"adapter": "turso", "url": "libsql://x", "authToken": "t"}))?
///     .id
///     .clone();
///
/// registry.apply(&id, ConnectionEvent::ConnectAttempt)?;
/// registry.apply(&id, ConnectionEvent::ConnectSuccess)?;
/// assert_eq!(registry.get(&id)?.connection.status, ConnectionStatus::Connected);
/// # Ok::<(), mdxui_core::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    entries: Vec<RegisteredConnection>,
    active: Option<ConnectionId>,
    validation: ValidationConfig,
    test_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ConnectionRegistry {
    /// Creates an empty registry with default validation settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry using the validation policy and the
    /// connect and connection test timeouts from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if `config` fails
    /// [`RuntimeConfig::validate`].
    pub fn with_config(config: &RuntimeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            validation: config.validation,
            test_timeout: config.connection_test_timeout,
            connect_timeout: config.connect_timeout,
            ..Self::default()
        })
    }

    /// Validates `input` and registers it as a new `disconnected` connection.
    ///
    /// # Errors
    ///
    /// Returns any error of
    /// [`validate_connection_config`](super::validate_connection_config).
    /// Nothing is registered on failure.
    pub fn register(&mut self, name: impl Into<String>, input: &Value) -> Result<&DatabaseConnection> {
        let config = validate_connection_config(input, self.validation.unknown_fields)?;
        Ok(self.register_config(name, config))
    }

    /// Registers an already validated config.
    pub fn register_config(
        &mut self,
        name: impl Into<String>,
        config: ConnectionConfig,
    ) -> &DatabaseConnection {
        let connection = DatabaseConnection::new(
            ConnectionId::generate(),
            name,
            DatabaseType::for_adapter(config.adapter()),
            DurableObjectId::generate(),
        );
        info!(
            connection = %connection.id,
            adapter = %config.adapter(),
            endpoint = %config.endpoint(),
            "connection registered"
        );

        let index = self.entries.len();
        self.entries.push(RegisteredConnection { connection, config });
        &self.entries[index].connection
    }

    /// Looks up a connection by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] for an unknown id.
    pub fn get(&self, id: &ConnectionId) -> Result<&RegisteredConnection> {
        self.entries
            .iter()
            .find(|entry| &entry.connection.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn get_mut(&mut self, id: &ConnectionId) -> Result<&mut RegisteredConnection> {
        self.entries
            .iter_mut()
            .find(|entry| &entry.connection.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Connections in registration order.
    pub fn list(&self) -> impl Iterator<Item = &DatabaseConnection> {
        self.entries.iter().map(|entry| &entry.connection)
    }

    /// Number of registered connections.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Marks a connection as active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] for an unknown id; the previous
    /// selection is kept.
    pub fn select(&mut self, id: &ConnectionId) -> Result<()> {
        self.get(id)?;
        debug!(connection = %id, "connection selected");
        self.active = Some(id.clone());
        Ok(())
    }

    /// The active connection, if one is selected.
    #[must_use]
    pub fn active(&self) -> Option<&DatabaseConnection> {
        let id = self.active.as_ref()?;
        self.get(id).ok().map(|entry| &entry.connection)
    }

    /// Applies a lifecycle event to a connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] for an unknown id, or
    /// [`Error::InvalidTransition`] if the event is not allowed.
    pub fn apply(&mut self, id: &ConnectionId, event: ConnectionEvent) -> Result<ConnectionStatus> {
        self.get_mut(id)?.connection.apply(event)
    }

    /// Removes a connection, clearing the active selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] for an unknown id.
    pub fn remove(&mut self, id: &ConnectionId) -> Result<RegisteredConnection> {
        let index = self
            .entries
            .iter()
            .position(|entry| &entry.connection.id == id)
            .ok_or_else(|| not_found(id))?;

        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        info!(connection = %id, "connection removed");
        Ok(self.entries.remove(index))
    }

    /// Drives a connection to `connected` through `handler`.
    ///
    /// A `disconnected` connection is moved with `connect-attempt`, a
    /// connection in `error` with `retry`. The handler outcome is then
    /// applied as `connect-success` or `connect-failure`.
    ///
    /// If the configured connect timeout elapses, or the returned future is
    /// dropped before the handler answers, the connection is moved to
    /// `error` so a later `connect` can retry it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] for an unknown id,
    /// [`Error::InvalidTransition`] if the connection is already connected
    /// or connecting, [`Error::Timeout`] if the connect timeout elapsed, or
    /// the handler error. Both of the last two leave the connection in
    /// `error`.
    pub async fn connect<H>(&mut self, id: &ConnectionId, handler: &H) -> Result<ConnectionStatus>
    where
        H: ConnectionHandler + ?Sized,
    {
        let connect_timeout = self.connect_timeout;
        let entry = self.get_mut(id)?;
        let event = if entry.connection.status == ConnectionStatus::Error {
            ConnectionEvent::Retry
        } else {
            ConnectionEvent::ConnectAttempt
        };
        entry.connection.apply(event)?;

        let pending = PendingConnect::new(&mut entry.connection);
        let outcome = match connect_timeout {
            Some(limit) => tokio::time::timeout(limit, handler.connect(&entry.config))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Timeout {
                        operation: format!("connect {id}"),
                        duration_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    })
                }),
            None => handler.connect(&entry.config).await,
        };
        pending.settle();

        let entry = self.get_mut(id)?;
        match outcome {
            Ok(()) => entry.connection.apply(ConnectionEvent::ConnectSuccess),
            Err(err) => {
                warn!(connection = %id, error = %err, "connect failed");
                entry.connection.apply(ConnectionEvent::ConnectFailure)?;
                Err(err)
            }
        }
    }

    /// Closes a connected connection through `handler`.
    ///
    /// The status is only changed once the handler has succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] for an unknown id,
    /// [`Error::InvalidTransition`] if the connection is not connected, or
    /// the handler error.
    pub async fn disconnect<H>(&mut self, id: &ConnectionId, handler: &H) -> Result<ConnectionStatus>
    where
        H: ConnectionHandler + ?Sized,
    {
        let status = self.get(id)?.connection.status;
        if status.next(ConnectionEvent::Disconnect).is_none() {
            return Err(Error::InvalidTransition {
                from: status,
                event: ConnectionEvent::Disconnect,
            });
        }

        handler.disconnect(id).await?;
        self.apply(id, ConnectionEvent::Disconnect)
    }

    /// Tests a registered connection's config without touching its status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] for an unknown id. Handler
    /// failures are reported inside the [`TestResult`].
    pub async fn test<H>(&self, id: &ConnectionId, handler: &H) -> Result<TestResult>
    where
        H: ConnectionHandler + ?Sized,
    {
        let entry = self.get(id)?;
        Ok(test_connection(handler, &entry.config, self.test_timeout).await)
    }
}

/// Moves a connection still `connecting` to `error` when dropped unsettled.
#[derive(Debug)]
struct PendingConnect<'a> {
    connection: &'a mut DatabaseConnection,
    settled: bool,
}

impl<'a> PendingConnect<'a> {
    const fn new(connection: &'a mut DatabaseConnection) -> Self {
        Self {
            connection,
            settled: false,
        }
    }

    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingConnect<'_> {
    fn drop(&mut self) {
        if self.settled || self.connection.status != ConnectionStatus::Connecting {
            return;
        }
        warn!(connection = %self.connection.id, "connect abandoned before the handler answered");
        if let Err(err) = self.connection.apply(ConnectionEvent::ConnectFailure) {
            warn!(connection = %self.connection.id, error = %err, "could not mark connection as failed");
        }
    }
}

fn not_found(id: &ConnectionId) -> Error {
    Error::ResourceNotFound {
        resource: format!("connection {id}"),
    }
}
