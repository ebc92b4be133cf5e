//! Strong identifier types.
//!
//! Connection ids, durable object references, tool names and invocation ids
//! are all strings on the wire. Wrapping them keeps a connection id from
//! being passed where a tool name is expected.
//!
//! # Examples
//!
//! ```
//! use mdxui_core::{ConnectionId, ToolName};
//!
//! let conn = ConnectionId::new("conn-123");
//! let tool = ToolName::new("database_query");
//! assert_eq!(conn.as_str(), "conn-123");
//! assert_eq!(tool.to_string(), "database_query");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            #[inline]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier and returns the inner `String`.
            #[inline]
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a registered database connection.
    ConnectionId
);

string_id!(
    /// Opaque host-assigned reference to the Durable Object backing a connection.
    DurableObjectId
);

string_id!(
    /// Name of an MCP tool.
    ToolName
);

string_id!(
    /// Identifier of a recorded tool invocation.
    InvocationId
);

impl ConnectionId {
    /// Generates a fresh random connection id (`conn-<uuid>`).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("conn-{}", Uuid::new_v4()))
    }
}

impl DurableObjectId {
    /// Generates a fresh random durable object reference (`do-<uuid>`).
    ///
    /// Real references are assigned by the host; this is used when a
    /// connection is registered before the host has produced one.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("do-{}", Uuid::new_v4().simple()))
    }
}

impl InvocationId {
    /// Generates a fresh random invocation id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
