//! Structured validation of untrusted connection config payloads.
//!
//! Serde's derive gives a single opaque message on failure. Form and API
//! layers need to know *which* field failed and *why*, so configs coming
//! from outside are checked here field by field:
//!
//! 1. the `adapter` discriminant is inspected first
//! 2. required fields of that adapter, in declaration order
//! 3. optional fields, when present
//! 4. undeclared fields, according to [`UnknownFieldPolicy`]

use serde_json::Value;
use tracing::debug;

use super::config::{
    AdapterKind, ConnectionConfig, D1ConnectionConfig, SupabaseConnectionConfig,
    TursoConnectionConfig, DEFAULT_SUPABASE_SCHEMA,
};
use crate::validation::{FieldReader, json_type_name};
use crate::{Error, Result, UnknownFieldPolicy};

/// Validates an untyped JSON value as a [`ConnectionConfig`].
///
/// # Errors
///
/// - [`Error::TypeMismatch`] if the input is not an object, or a field has
///   the wrong JSON type
/// - [`Error::UnknownAdapter`] if `adapter` is missing, not a string, or not
///   a supported adapter
/// - [`Error::MissingField`] if a required adapter field is absent or `null`
/// - [`Error::ValidationError`] for undeclared fields under
///   [`UnknownFieldPolicy::Reject`]
///
/// # Examples
///
/// ```
/// use mdxui_core::connection::{validate_connection_config, AdapterKind};
/// use mdxui_core::UnknownFieldPolicy;
/// use serde_json::json;
///
/// let config = validate_connection_config(
///     &json!({"adapter": "turso", "url": "libsql://x", "authToken": "t"}),
///     UnknownFieldPolicy::Ignore,
/// )?;
/// assert_eq!(config.adapter(), AdapterKind::Turso);
///
/// let err = validate_connection_config(
///     &json!({"adapter": "d1", "databaseId": "db"}),
///     UnknownFieldPolicy::Ignore,
/// )
/// .unwrap_err();
/// assert!(err.is_missing_field());
/// # Ok::<(), mdxui_core::Error>(())
/// ```
pub fn validate_connection_config(
    input: &Value,
    policy: UnknownFieldPolicy,
) -> Result<ConnectionConfig> {
    let mut reader = FieldReader::new(input, "")?;
    let adapter = read_adapter(&mut reader)?;

    let config = match adapter {
        AdapterKind::Turso => ConnectionConfig::Turso(TursoConnectionConfig {
            url: reader.required_str("url")?,
            auth_token: reader.required_str("authToken")?,
            sync_url: reader.optional_str("syncUrl")?,
            sync_interval: reader.optional_non_negative_f64("syncInterval")?,
        }),
        AdapterKind::D1 => ConnectionConfig::D1(D1ConnectionConfig {
            database_id: reader.required_str("databaseId")?,
            account_id: reader.required_str("accountId")?,
            api_token: reader.required_str("apiToken")?,
            binding: reader.optional_str("binding")?,
        }),
        AdapterKind::Supabase => ConnectionConfig::Supabase(SupabaseConnectionConfig {
            project_url: reader.required_str("projectUrl")?,
            anon_key: reader.required_str("anonKey")?,
            service_role_key: reader.optional_str("serviceRoleKey")?,
            schema: reader
                .optional_str("schema")?
                .unwrap_or_else(|| DEFAULT_SUPABASE_SCHEMA.to_string()),
        }),
    };

    reader.finish(policy)?;

    debug!(adapter = %adapter, "connection config validated");
    Ok(config)
}

fn read_adapter(reader: &mut FieldReader<'_>) -> Result<AdapterKind> {
    match reader.raw("adapter") {
        None => Err(Error::UnknownAdapter { found: None }),
        Some(Value::String(s)) => s.parse(),
        Some(other) => Err(Error::UnknownAdapter {
            found: Some(format!("<{}>", json_type_name(other))),
        }),
    }
}

impl ConnectionConfig {
    /// Validates an untyped JSON value. See [`validate_connection_config`].
    ///
    /// # Errors
    ///
    /// Same as [`validate_connection_config`].
    pub fn from_value(input: &Value, policy: UnknownFieldPolicy) -> Result<Self> {
        validate_connection_config(input, policy)
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationError`] for malformed JSON, otherwise
    /// the errors of [`validate_connection_config`].
    pub fn from_json_str(json: &str, policy: UnknownFieldPolicy) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        validate_connection_config(&value, policy)
    }
}
