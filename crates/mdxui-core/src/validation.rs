//! Helpers for validating untyped JSON input.
//!
//! [`FieldReader`] walks a JSON object field by field and produces the
//! structured errors ([`Error::MissingField`], [`Error::TypeMismatch`]) that a
//! form layer can attach to individual inputs. Fields it was asked about are
//! tracked so [`FieldReader::finish`] can enforce the [`UnknownFieldPolicy`].
//!
//! # Examples
//!
//! ```
//! use mdxui_core::validation::FieldReader;
//! use mdxui_core::UnknownFieldPolicy;
//! use serde_json::json;
//!
//! let input = json!({"name": "replica", "interval": 0.5});
//! let mut reader = FieldReader::new(&input, "sync")?;
//! let name = reader.required_str("name")?;
//! let interval = reader.optional_non_negative_f64("interval")?;
//! reader.finish(UnknownFieldPolicy::Reject)?;
//!
//! assert_eq!(name, "replica");
//! assert_eq!(interval, Some(0.5));
//! # Ok::<(), mdxui_core::Error>(())
//! ```

use crate::{Error, Result, UnknownFieldPolicy};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Returns the JSON type name of a value, as used in error messages.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Joins a parent path and a field name (`parent.field`).
#[must_use]
pub fn join_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

/// Builds a [`Error::TypeMismatch`] for `value` at `field`.
pub fn type_mismatch(field: impl Into<String>, expected: &str, value: &Value) -> Error {
    Error::TypeMismatch {
        field: field.into(),
        expected: expected.to_string(),
        found: json_type_name(value).to_string(),
    }
}

/// Field-by-field reader over a JSON object.
#[derive(Debug)]
pub struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    path: &'a str,
    seen: HashSet<&'a str>,
}

impl<'a> FieldReader<'a> {
    /// Starts reading `value`, which must be a JSON object.
    ///
    /// `path` prefixes every field name in errors; pass `""` for the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `value` is not an object.
    pub fn new(value: &'a Value, path: &'a str) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            let field = if path.is_empty() { "<root>" } else { path };
            type_mismatch(field, "object", value)
        })?;
        Ok(Self {
            object,
            path,
            seen: HashSet::new(),
        })
    }

    /// Returns the raw value of a field, treating `null` as absent.
    pub fn raw(&mut self, field: &'a str) -> Option<&'a Value> {
        self.seen.insert(field);
        let object: &'a Map<String, Value> = self.object;
        object.get(field).filter(|v| !v.is_null())
    }

    fn path_of(&self, field: &str) -> String {
        join_path(self.path, field)
    }

    /// Reads a required string field.
    ///
    /// # Errors
    ///
    /// [`Error::MissingField`] if absent or `null`, [`Error::TypeMismatch`]
    /// if not a string.
    pub fn required_str(&mut self, field: &'a str) -> Result<String> {
        self.optional_str(field)?.ok_or_else(|| Error::MissingField {
            field: self.path_of(field),
        })
    }

    /// Reads an optional string field.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if present and not a string.
    pub fn optional_str(&mut self, field: &'a str) -> Result<Option<String>> {
        match self.raw(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(type_mismatch(self.path_of(field), "string", other)),
        }
    }

    /// Reads an optional non-negative number field, integer or fractional.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if present and not a number,
    /// [`Error::ValidationError`] if negative.
    pub fn optional_non_negative_f64(&mut self, field: &'a str) -> Result<Option<f64>> {
        let Some(value) = self.raw(field) else {
            return Ok(None);
        };
        // JSON numbers are always finite, so only the sign needs checking.
        let number = value
            .as_f64()
            .ok_or_else(|| type_mismatch(self.path_of(field), "number", value))?;
        if number < 0.0 {
            return Err(Error::ValidationError {
                field: self.path_of(field),
                reason: format!("must be non-negative, got {number}"),
            });
        }
        Ok(Some(number))
    }

    /// Reads an optional boolean field.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if present and not a boolean.
    pub fn optional_bool(&mut self, field: &'a str) -> Result<Option<bool>> {
        match self.raw(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(type_mismatch(self.path_of(field), "boolean", other)),
        }
    }

    /// Marks a field as declared without reading it.
    pub fn declare(&mut self, field: &'a str) {
        self.seen.insert(field);
    }

    /// Applies the unknown field policy to every field not yet read.
    ///
    /// Fields are checked in sorted order so the reported field is stable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for the first undeclared field when
    /// the policy is [`UnknownFieldPolicy::Reject`].
    pub fn finish(self, policy: UnknownFieldPolicy) -> Result<()> {
        if policy == UnknownFieldPolicy::Ignore {
            return Ok(());
        }

        let mut unknown: Vec<&String> = self
            .object
            .keys()
            .filter(|k| !self.seen.contains(k.as_str()))
            .collect();
        unknown.sort();

        match unknown.first() {
            Some(field) => Err(Error::ValidationError {
                field: join_path(self.path, field),
                reason: "unknown field".to_string(),
            }),
            None => Ok(()),
        }
    }
}
