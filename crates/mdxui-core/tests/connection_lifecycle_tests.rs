//! End-to-end connection lifecycle through the registry and a handler.

use async_trait::async_trait;
use mdxui_core::connection::{
    ConnectionConfig, ConnectionEvent, ConnectionHandler, ConnectionRegistry, ConnectionStatus,
    DatabaseType, TestResult,
};
use mdxui_core::{ConnectionId, Error, Result, RuntimeConfig};
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Handler whose connect outcome is scripted per call.
#[derive(Default)]
struct ScriptedHandler {
    connect_failures: Mutex<Vec<String>>,
    stalled_connects: AtomicUsize,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl ScriptedHandler {
    fn failing_once(message: &str) -> Self {
        Self {
            connect_failures: Mutex::new(vec![message.to_string()]),
            ..Self::default()
        }
    }

    /// The first `count` connects never answer within a test's lifetime.
    fn stalling(count: usize) -> Self {
        Self {
            stalled_connects: AtomicUsize::new(count),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ConnectionHandler for ScriptedHandler {
    async fn connect(&self, _config: &ConnectionConfig) -> Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let stall = self
            .stalled_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stall {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        match self.connect_failures.lock().unwrap().pop() {
            Some(message) => Err(Error::execution(message)),
            None => Ok(()),
        }
    }

    async fn disconnect(&self, _id: &ConnectionId) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn test_connection(&self, config: &ConnectionConfig) -> Result<TestResult> {
        if config.as_d1().is_some() {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(TestResult::ok(3.0).with_tables(["users"]))
    }
}

fn turso() -> serde_json::Value {
    json!({"adapter": "turso", "url": "libsql://studio.turso.io", "authToken": "t"})
}

#[test]
fn test_turso_registration_to_connected_by_events() {
    let mut registry = ConnectionRegistry::new();
    let id = registry.register("Edge", &turso()).unwrap().id.clone();

    let conn = &registry.get(&id).unwrap().connection;
    assert_eq!(conn.status, ConnectionStatus::Disconnected);
    assert_eq!(conn.db_type, DatabaseType::Sqlite);

    assert_eq!(
        registry.apply(&id, ConnectionEvent::ConnectAttempt).unwrap(),
        ConnectionStatus::Connecting
    );
    assert_eq!(
        registry.apply(&id, ConnectionEvent::ConnectSuccess).unwrap(),
        ConnectionStatus::Connected
    );
    assert!(registry.get(&id).unwrap().connection.last_connected_at.is_some());
}

#[tokio::test]
async fn test_connect_and_disconnect_through_handler() {
    let handler = ScriptedHandler::default();
    let mut registry = ConnectionRegistry::new();
    let id = registry.register("Edge", &turso()).unwrap().id.clone();

    let status = registry.connect(&id, &handler).await.unwrap();
    assert_eq!(status, ConnectionStatus::Connected);

    // Already connected: rejected before the handler is called.
    assert!(registry.connect(&id, &handler).await.unwrap_err().is_invalid_transition());
    assert_eq!(handler.connects.load(Ordering::SeqCst), 1);

    let status = registry.disconnect(&id, &handler).await.unwrap();
    assert_eq!(status, ConnectionStatus::Disconnected);
    assert_eq!(handler.disconnects.load(Ordering::SeqCst), 1);

    assert!(registry.disconnect(&id, &handler).await.unwrap_err().is_invalid_transition());
    assert_eq!(handler.disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_connect_then_retry() {
    let handler = ScriptedHandler::failing_once("auth token expired");
    let mut registry = ConnectionRegistry::new();
    let id = registry.register("Edge", &turso()).unwrap().id.clone();

    let err = registry.connect(&id, &handler).await.unwrap_err();
    assert!(err.is_execution_failure());
    assert_eq!(registry.get(&id).unwrap().connection.status, ConnectionStatus::Error);

    let status = registry.connect(&id, &handler).await.unwrap();
    assert_eq!(status, ConnectionStatus::Connected);
    assert_eq!(handler.connects.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_registry_test_uses_configured_timeout() {
    let config = RuntimeConfig::builder()
        .connection_test_timeout(Duration::from_millis(500))
        .build();
    let handler = ScriptedHandler::default();
    let mut registry = ConnectionRegistry::with_config(&config).unwrap();

    let turso_id = registry.register("Edge", &turso()).unwrap().id.clone();
    let d1_id = registry
        .register(
            "Workers",
            &json!({"adapter": "d1", "databaseId": "a", "accountId": "b", "apiToken": "c"}),
        )
        .unwrap()
        .id
        .clone();

    let ok = registry.test(&turso_id, &handler).await.unwrap();
    assert!(ok.success);
    assert_eq!(ok.tables.as_deref(), Some(&["users".to_string()][..]));

    let slow = registry.test(&d1_id, &handler).await.unwrap();
    assert!(!slow.success);
    assert_eq!(slow.error.as_deref(), Some("timeout"));

    // Testing never moves the status machine.
    assert_eq!(
        registry.get(&d1_id).unwrap().connection.status,
        ConnectionStatus::Disconnected
    );
}

#[tokio::test(start_paused = true)]
async fn test_connect_timeout_moves_to_error_then_retries() {
    let config = RuntimeConfig::builder()
        .connect_timeout(Duration::from_millis(200))
        .build();
    let handler = ScriptedHandler::stalling(1);
    let mut registry = ConnectionRegistry::with_config(&config).unwrap();
    let id = registry.register("Edge", &turso()).unwrap().id.clone();

    let err = registry.connect(&id, &handler).await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(registry.get(&id).unwrap().connection.status, ConnectionStatus::Error);

    let status = registry.connect(&id, &handler).await.unwrap();
    assert_eq!(status, ConnectionStatus::Connected);
    assert_eq!(handler.connects.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_connect_can_be_retried() {
    let handler = ScriptedHandler::stalling(1);
    let mut registry = ConnectionRegistry::new();
    let id = registry.register("Edge", &turso()).unwrap().id.clone();

    // The caller gives up; the registry itself has no connect timeout.
    let abandoned =
        tokio::time::timeout(Duration::from_millis(10), registry.connect(&id, &handler)).await;
    assert!(abandoned.is_err());
    assert_eq!(registry.get(&id).unwrap().connection.status, ConnectionStatus::Error);

    let status = registry.connect(&id, &handler).await.unwrap();
    assert_eq!(status, ConnectionStatus::Connected);
    assert!(registry.get(&id).unwrap().connection.last_connected_at.is_some());
}
