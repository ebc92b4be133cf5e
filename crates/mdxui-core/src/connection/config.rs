//! Adapter-specific connection configuration.
//!
//! A [`ConnectionConfig`] is a tagged union keyed by `adapter`: exactly one
//! of the Turso, Cloudflare D1 or Supabase shapes is active per value.
//!
//! # Examples
//!
//! ```
//! use mdxui_core::connection::{AdapterKind, ConnectionConfig, TursoConnectionConfig};
//!
//! let config = ConnectionConfig::Turso(TursoConnectionConfig::new(
//!     "libsql://studio.turso.io",
//!     "token",
//! ));
//! assert_eq!(config.adapter(), AdapterKind::Turso);
//!
//! let json = serde_json::to_value(&config).unwrap();
//! assert_eq!(json["adapter"], "turso");
//! assert_eq!(json["authToken"], "token");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Default Postgres schema for Supabase connections.
pub const DEFAULT_SUPABASE_SCHEMA: &str = "public";

/// Backend kind selected by the `adapter` discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Turso (libSQL)
    Turso,
    /// Cloudflare D1
    D1,
    /// Supabase
    Supabase,
}

impl AdapterKind {
    /// Every supported adapter, in declaration order.
    pub const ALL: [Self; 3] = [Self::Turso, Self::D1, Self::Supabase];

    /// Returns the wire name of the adapter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Turso => "turso",
            Self::D1 => "d1",
            Self::Supabase => "supabase",
        }
    }

    /// Required fields (besides `adapter`) for this adapter's config.
    #[must_use]
    pub const fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Turso => &["url", "authToken"],
            Self::D1 => &["databaseId", "accountId", "apiToken"],
            Self::Supabase => &["projectUrl", "anonKey"],
        }
    }

    /// Optional fields for this adapter's config.
    #[must_use]
    pub const fn optional_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Turso => &["syncUrl", "syncInterval"],
            Self::D1 => &["binding"],
            Self::Supabase => &["serviceRoleKey", "schema"],
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "turso" => Ok(Self::Turso),
            "d1" => Ok(Self::D1),
            "supabase" => Ok(Self::Supabase),
            _ => Err(Error::UnknownAdapter {
                found: Some(s.to_string()),
            }),
        }
    }
}

/// Turso (libSQL) connection configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TursoConnectionConfig {
    /// `libsql://` database URL
    pub url: String,
    /// Database auth token
    pub auth_token: String,
    /// Primary URL for embedded replicas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_url: Option<String>,
    /// Replica sync interval, in seconds; non-negative and finite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_interval: Option<f64>,
}

impl TursoConnectionConfig {
    /// Creates a config for a remote database.
    #[must_use]
    pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: auth_token.into(),
            sync_url: None,
            sync_interval: None,
        }
    }

    /// Returns `true` if this config describes an embedded replica.
    #[must_use]
    pub const fn is_embedded_replica(&self) -> bool {
        self.sync_url.is_some()
    }
}

impl fmt::Debug for TursoConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TursoConnectionConfig")
            .field("url", &self.url)
            .field("auth_token", &"<redacted>")
            .field("sync_url", &self.sync_url)
            .field("sync_interval", &self.sync_interval)
            .finish()
    }
}

/// Cloudflare D1 connection configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct D1ConnectionConfig {
    /// D1 database UUID
    pub database_id: String,
    /// Cloudflare account id
    pub account_id: String,
    /// Cloudflare API token
    pub api_token: String,
    /// Wrangler binding name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
}

impl D1ConnectionConfig {
    /// Creates a config without a binding name.
    #[must_use]
    pub fn new(
        database_id: impl Into<String>,
        account_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            database_id: database_id.into(),
            account_id: account_id.into(),
            api_token: api_token.into(),
            binding: None,
        }
    }
}

impl fmt::Debug for D1ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("D1ConnectionConfig")
            .field("database_id", &self.database_id)
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .field("binding", &self.binding)
            .finish()
    }
}

/// Supabase connection configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupabaseConnectionConfig {
    /// Project URL
    pub project_url: String,
    /// Public anon key
    pub anon_key: String,
    /// Service role key for admin operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_role_key: Option<String>,
    /// Postgres schema
    #[serde(default = "default_schema")]
    pub schema: String,
}

fn default_schema() -> String {
    DEFAULT_SUPABASE_SCHEMA.to_string()
}

impl SupabaseConnectionConfig {
    /// Creates a config using the `public` schema.
    #[must_use]
    pub fn new(project_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into(),
            anon_key: anon_key.into(),
            service_role_key: None,
            schema: default_schema(),
        }
    }

    /// Returns `true` if a service role key is configured.
    #[must_use]
    pub const fn has_admin_access(&self) -> bool {
        self.service_role_key.is_some()
    }
}

impl fmt::Debug for SupabaseConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConnectionConfig")
            .field("project_url", &self.project_url)
            .field("anon_key", &"<redacted>")
            .field(
                "service_role_key",
                &self.service_role_key.as_ref().map(|_| "<redacted>"),
            )
            .field("schema", &self.schema)
            .finish()
    }
}

/// Connection configuration for one of the supported adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "adapter", rename_all = "lowercase")]
pub enum ConnectionConfig {
    /// Turso (libSQL)
    Turso(TursoConnectionConfig),
    /// Cloudflare D1
    D1(D1ConnectionConfig),
    /// Supabase
    Supabase(SupabaseConnectionConfig),
}

impl ConnectionConfig {
    /// Returns the adapter discriminant.
    #[must_use]
    pub const fn adapter(&self) -> AdapterKind {
        match self {
            Self::Turso(_) => AdapterKind::Turso,
            Self::D1(_) => AdapterKind::D1,
            Self::Supabase(_) => AdapterKind::Supabase,
        }
    }

    /// Returns the Turso config, if this is one.
    #[must_use]
    pub const fn as_turso(&self) -> Option<&TursoConnectionConfig> {
        match self {
            Self::Turso(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the D1 config, if this is one.
    #[must_use]
    pub const fn as_d1(&self) -> Option<&D1ConnectionConfig> {
        match self {
            Self::D1(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the Supabase config, if this is one.
    #[must_use]
    pub const fn as_supabase(&self) -> Option<&SupabaseConnectionConfig> {
        match self {
            Self::Supabase(c) => Some(c),
            _ => None,
        }
    }

    /// Human-readable endpoint for logs and selectors. Never includes secrets.
    #[must_use]
    pub fn endpoint(&self) -> String {
        match self {
            Self::Turso(c) => c.url.clone(),
            Self::D1(c) => format!("d1://{}/{}", c.account_id, c.database_id),
            Self::Supabase(c) => format!("{}#{}", c.project_url, c.schema),
        }
    }
}

impl From<TursoConnectionConfig> for ConnectionConfig {
    fn from(config: TursoConnectionConfig) -> Self {
        Self::Turso(config)
    }
}

impl From<D1ConnectionConfig> for ConnectionConfig {
    fn from(config: D1ConnectionConfig) -> Self {
        Self::D1(config)
    }
}

impl From<SupabaseConnectionConfig> for ConnectionConfig {
    fn from(config: SupabaseConnectionConfig) -> Self {
        Self::Supabase(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_adapter_kind_round_trip() {
        for kind in AdapterKind::ALL {
            assert_eq!(kind.as_str().parse::<AdapterKind>().unwrap(), kind);
        }
        assert!("mysql".parse::<AdapterKind>().unwrap_err().is_unknown_adapter());
    }

    #[test]
    fn test_tagged_serialization() {
        let config: ConnectionConfig =
            D1ConnectionConfig::new("db-uuid", "acct", "cf-token").into();
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(
            json,
            json!({
                "adapter": "d1",
                "databaseId": "db-uuid",
                "accountId": "acct",
                "apiToken": "cf-token"
            })
        );
    }

    #[test]
    fn test_supabase_schema_defaults_on_deserialize() {
        let config: ConnectionConfig = serde_json::from_value(json!({
            "adapter": "supabase",
            "projectUrl": "https://x.supabase.co",
            "anonKey": "anon"
        }))
        .unwrap();

        let supabase = config.as_supabase().unwrap();
        assert_eq!(supabase.schema, DEFAULT_SUPABASE_SCHEMA);
        assert!(!supabase.has_admin_access());
        assert!(config.as_turso().is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let turso = TursoConnectionConfig::new("libsql://db", "super-secret");
        let debug = format!("{turso:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("libsql://db"));

        let mut supabase = SupabaseConnectionConfig::new("https://p", "anon-secret");
        supabase.service_role_key = Some("role-secret".to_string());
        let debug = format!("{supabase:?}");
        assert!(!debug.contains("anon-secret"));
        assert!(!debug.contains("role-secret"));
    }

    #[test]
    fn test_endpoint_has_no_secrets() {
        let config = ConnectionConfig::D1(D1ConnectionConfig::new("db", "acct", "secret"));
        assert_eq!(config.endpoint(), "d1://acct/db");
        assert!(!config.endpoint().contains("secret"));
    }

    #[test]
    fn test_embedded_replica_detection() {
        let mut turso = TursoConnectionConfig::new("file:local.db", "t");
        assert!(!turso.is_embedded_replica());
        turso.sync_url = Some("libsql://primary".to_string());
        assert!(turso.is_embedded_replica());
    }
}
