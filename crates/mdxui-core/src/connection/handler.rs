//! Connection handler trait and the latency-measuring test wrapper.
//!
//! A [`ConnectionHandler`] is the host-side collaborator that actually talks
//! to a database. This crate never opens connections itself; it drives the
//! handler and keeps the status machine honest around it.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::config::ConnectionConfig;
use super::database::DatabaseConnection;
use super::test_result::TestResult;
use crate::{ConnectionId, Error, Result};

/// Host callbacks for connection management.
///
/// `connect`, `disconnect` and `test_connection` are required. Saving,
/// deleting and selecting connections are optional capabilities; their
/// default bodies return [`Error::NotImplemented`].
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use mdxui_core::connection::{ConnectionConfig, ConnectionHandler, TestResult};
/// use mdxui_core::{ConnectionId, Result};
///
/// struct AlwaysUp;
///
/// #[async_trait]
/// impl ConnectionHandler for AlwaysUp {
///     async fn connect(&self, _config: &ConnectionConfig) -> Result<()> {
///         Ok(())
///     }
///
///     async fn disconnect(&self, _id: &ConnectionId) -> Result<()> {
///         Ok(())
///     }
///
///     async fn test_connection(&self, _config: &ConnectionConfig) -> Result<TestResult> {
///         Ok(TestResult::ok(1.0))
///     }
/// }
/// ```
#[async_trait]
pub trait ConnectionHandler: Send + Sync {
    /// Opens a connection described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or rejects the
    /// credentials.
    async fn connect(&self, config: &ConnectionConfig) -> Result<()>;

    /// Closes the connection with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to close the connection.
    async fn disconnect(&self, id: &ConnectionId) -> Result<()>;

    /// Checks that `config` can reach its backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the test itself could not be carried out. A
    /// reachable backend that refuses the credentials should be reported as
    /// an unsuccessful [`TestResult`] instead.
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<TestResult>;

    /// Persists a connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] unless overridden.
    async fn save_connection(&self, _connection: &DatabaseConnection) -> Result<()> {
        Err(Error::NotImplemented {
            feature: "save_connection".to_string(),
        })
    }

    /// Deletes a persisted connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] unless overridden.
    async fn delete_connection(&self, _id: &ConnectionId) -> Result<()> {
        Err(Error::NotImplemented {
            feature: "delete_connection".to_string(),
        })
    }

    /// Marks a connection as the active one on the host side.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] unless overridden.
    async fn select_connection(&self, _id: &ConnectionId) -> Result<()> {
        Err(Error::NotImplemented {
            feature: "select_connection".to_string(),
        })
    }
}

/// Runs `handler.test_connection(config)` and never fails.
///
/// A result returned by the handler is passed through unchanged. A handler
/// error becomes an unsuccessful result carrying the error message, and an
/// expired `timeout` becomes an unsuccessful result with error `"timeout"`.
/// In both failure cases `latency_ms` is the measured wall-clock time.
///
/// # Examples
///
/// ```
/// # use async_trait::async_trait;
/// # use mdxui_core::connection::*;
/// # use mdxui_core::{ConnectionId, Error, Result};
/// struct Refusing;
///
/// #[async_trait]
/// impl ConnectionHandler for Refusing {
///     async fn connect(&self, _: &ConnectionConfig) -> Result<()> { Ok(()) }
///     async fn disconnect(&self, _: &ConnectionId) -> Result<()> { Ok(()) }
///     async fn test_connection(&self, _: &ConnectionConfig) -> Result<TestResult> {
///         Err(Error::execution("connection refused"))
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = TursoConnectionConfig::new("libsql://db", "t").into();
/// let result = test_connection(&Refusing, &config, None).await;
/// assert!(!result.success);
/// assert!(result.error.unwrap().contains("connection refused"));
/// # }
/// ```
pub async fn test_connection<H>(
    handler: &H,
    config: &ConnectionConfig,
    timeout: Option<Duration>,
) -> TestResult
where
    H: ConnectionHandler + ?Sized,
{
    let start = Instant::now();
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, handler.test_connection(config))
            .await
            .map_err(|_| limit),
        None => Ok(handler.test_connection(config).await),
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok(Ok(result)) => {
            debug!(
                endpoint = %config.endpoint(),
                success = result.success,
                latency_ms = result.latency_ms,
                "connection test finished"
            );
            result
        }
        Ok(Err(err)) => {
            warn!(endpoint = %config.endpoint(), error = %err, "connection test failed");
            TestResult::failed(elapsed_ms, err.to_string())
        }
        Err(limit) => {
            warn!(
                endpoint = %config.endpoint(),
                timeout_ms = limit.as_millis(),
                "connection test timed out"
            );
            TestResult::timed_out(elapsed_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::TursoConnectionConfig;

    struct ScriptedHandler {
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl ConnectionHandler for ScriptedHandler {
        async fn connect(&self, _config: &ConnectionConfig) -> Result<()> {
            Ok(())
        }

        async fn disconnect(&self, _id: &ConnectionId) -> Result<()> {
            Ok(())
        }

        async fn test_connection(&self, _config: &ConnectionConfig) -> Result<TestResult> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(Error::execution("auth rejected"));
            }
            Ok(TestResult::ok(7.0).with_server_version("3.45.0"))
        }
    }

    fn config() -> ConnectionConfig {
        TursoConnectionConfig::new("libsql://db", "token").into()
    }

    #[tokio::test]
    async fn test_handler_result_passes_through() {
        let handler = ScriptedHandler {
            delay: Duration::ZERO,
            fail: false,
        };
        let result = test_connection(&handler, &config(), None).await;

        assert_eq!(result, TestResult::ok(7.0).with_server_version("3.45.0"));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_failed_result() {
        let handler = ScriptedHandler {
            delay: Duration::ZERO,
            fail: true,
        };
        let result = test_connection(&handler, &config(), Some(Duration::from_secs(5))).await;

        assert!(!result.success);
        assert!(result.is_consistent());
        assert!(result.error.unwrap().contains("auth rejected"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_failed_result() {
        let handler = ScriptedHandler {
            delay: Duration::from_secs(60),
            fail: false,
        };
        let result = test_connection(&handler, &config(), Some(Duration::from_millis(250))).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("timeout"));
        assert!(result.latency_ms >= 250.0);
    }

    #[tokio::test]
    async fn test_optional_capabilities_default_to_not_implemented() {
        let handler = ScriptedHandler {
            delay: Duration::ZERO,
            fail: false,
        };
        let id = ConnectionId::new("conn-1");

        assert!(handler.delete_connection(&id).await.unwrap_err().is_not_implemented());
        assert!(handler.select_connection(&id).await.unwrap_err().is_not_implemented());
    }
}
