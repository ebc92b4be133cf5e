//! Connection lifecycle status and its state machine.
//!
//! ```text
//!  disconnected --connect-attempt--> connecting --connect-success--> connected
//!       ^                              |    ^                           |
//!       |                   connect-failure  retry                      |
//!       |                              v    |                           |
//!       |                              error                            |
//!       +---------------------------disconnect--------------------------+
//! ```
//!
//! Any other (status, event) pair is rejected with
//! [`Error::InvalidTransition`] and leaves the status untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Runtime status of a database connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Connected and usable.
    Connected,
    /// Not connected. Initial state of every registered connection.
    #[default]
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The last connection attempt failed.
    Error,
}

/// Event that drives a [`ConnectionStatus`] transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionEvent {
    /// Begin connecting (`disconnected → connecting`).
    ConnectAttempt,
    /// The attempt succeeded (`connecting → connected`).
    ConnectSuccess,
    /// The attempt failed (`connecting → error`).
    ConnectFailure,
    /// Close the connection (`connected → disconnected`).
    Disconnect,
    /// Try again after a failure (`error → connecting`).
    Retry,
}

impl ConnectionStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Connected,
        Self::Disconnected,
        Self::Connecting,
        Self::Error,
    ];

    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Error => "error",
        }
    }

    /// Looks up the transition table without producing an error.
    #[must_use]
    pub const fn next(self, event: ConnectionEvent) -> Option<Self> {
        match (self, event) {
            (Self::Disconnected, ConnectionEvent::ConnectAttempt)
            | (Self::Error, ConnectionEvent::Retry) => Some(Self::Connecting),
            (Self::Connecting, ConnectionEvent::ConnectSuccess) => Some(Self::Connected),
            (Self::Connecting, ConnectionEvent::ConnectFailure) => Some(Self::Error),
            (Self::Connected, ConnectionEvent::Disconnect) => Some(Self::Disconnected),
            _ => None,
        }
    }

    /// Applies `event`, returning the new status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] carrying `(self, event)` when the
    /// pair is not in the transition table.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdxui_core::connection::{ConnectionEvent, ConnectionStatus};
    ///
    /// let status = ConnectionStatus::Disconnected
    ///     .transition(ConnectionEvent::ConnectAttempt)?
    ///     .transition(ConnectionEvent::ConnectSuccess)?;
    /// assert_eq!(status, ConnectionStatus::Connected);
    ///
    /// assert!(status.transition(ConnectionEvent::Retry).is_err());
    /// # Ok::<(), mdxui_core::Error>(())
    /// ```
    pub fn transition(self, event: ConnectionEvent) -> Result<Self> {
        self.next(event)
            .ok_or(Error::InvalidTransition { from: self, event })
    }

    /// Events accepted in this status.
    #[must_use]
    pub const fn allowed_events(self) -> &'static [ConnectionEvent] {
        match self {
            Self::Disconnected => &[ConnectionEvent::ConnectAttempt],
            Self::Connecting => &[
                ConnectionEvent::ConnectSuccess,
                ConnectionEvent::ConnectFailure,
            ],
            Self::Connected => &[ConnectionEvent::Disconnect],
            Self::Error => &[ConnectionEvent::Retry],
        }
    }

    /// Returns `true` while an attempt is in flight.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Connecting)
    }
}

impl ConnectionEvent {
    /// Every event, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::ConnectAttempt,
        Self::ConnectSuccess,
        Self::ConnectFailure,
        Self::Disconnect,
        Self::Retry,
    ];

    /// Returns the wire name of the event.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectAttempt => "connect-attempt",
            Self::ConnectSuccess => "connect-success",
            Self::ConnectFailure => "connect-failure",
            Self::Disconnect => "disconnect",
            Self::Retry => "retry",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConnectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "invalid connection status: '{s}' (expected: connected, disconnected, connecting, or error)"
                ))
            })
    }
}

impl FromStr for ConnectionEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "invalid connection event: '{s}' (expected: connect-attempt, connect-success, connect-failure, disconnect, or retry)"
                ))
            })
    }
}
