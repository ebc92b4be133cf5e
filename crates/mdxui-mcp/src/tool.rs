//! MCP tool definitions.
//!
//! A tool advertises its input as a JSON-Schema subset: an object whose
//! properties are [`McpToolParameter`]s. Parameters nest through `items`
//! for arrays, so the tree is recursive; its depth is bounded by
//! [`ValidationConfig::max_parameter_depth`].

use mdxui_core::validation::{FieldReader, join_path, type_mismatch};
use mdxui_core::{Error, Result, ToolName, ValidationConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::params::check_value;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// JSON string
    String,
    /// Any JSON number
    Number,
    /// `true` / `false`
    Boolean,
    /// JSON array, optionally typed through `items`
    Array,
    /// JSON object
    Object,
}

impl ParameterType {
    /// Every parameter type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::String,
        Self::Number,
        Self::Boolean,
        Self::Array,
        Self::Object,
    ];

    /// Returns the schema name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Returns `true` if `value` has this JSON type.
    #[must_use]
    pub const fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Array, Value::Array(_))
                | (Self::Object, Value::Object(_))
        )
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "invalid parameter type: '{s}' (expected: string, number, boolean, array, or object)"
                ))
            })
    }
}

/// A single tool parameter.
///
/// # Examples
///
/// ```
/// use mdxui_mcp::tool::{McpToolParameter, ParameterType};
///
/// let tags = McpToolParameter::array(McpToolParameter::string())
///     .with_description("Tags to attach");
/// assert_eq!(tags.param_type, ParameterType::Array);
/// assert_eq!(tags.depth(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolParameter {
    /// JSON type
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values for string parameters
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Value used when the caller omits the parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Element schema of an array parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Self>>,
}

impl McpToolParameter {
    /// Bare parameter of the given type.
    #[must_use]
    pub const fn new(param_type: ParameterType) -> Self {
        Self {
            param_type,
            description: None,
            enum_values: None,
            default: None,
            items: None,
        }
    }

    /// A string parameter.
    #[must_use]
    pub const fn string() -> Self {
        Self::new(ParameterType::String)
    }

    /// A number parameter.
    #[must_use]
    pub const fn number() -> Self {
        Self::new(ParameterType::Number)
    }

    /// A boolean parameter.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(ParameterType::Boolean)
    }

    /// An object parameter.
    #[must_use]
    pub const fn object() -> Self {
        Self::new(ParameterType::Object)
    }

    /// An array parameter whose elements follow `items`.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(ParameterType::Array)
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restricts a string parameter to `values`.
    #[must_use]
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Number of nested levels, counting this parameter as 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self;
        while let Some(items) = current.items.as_deref() {
            depth += 1;
            current = items;
        }
        depth
    }

    fn from_value(
        value: &Value,
        path: &str,
        level: usize,
        config: &ValidationConfig,
    ) -> Result<Self> {
        if level > config.max_parameter_depth {
            return Err(Error::RecursionLimit {
                field: path.to_string(),
                limit: config.max_parameter_depth,
            });
        }

        let mut reader = FieldReader::new(value, path)?;
        let type_name = reader.required_str("type")?;
        let param_type = type_name
            .parse::<ParameterType>()
            .map_err(|err| Error::ValidationError {
                field: join_path(path, "type"),
                reason: err.to_string(),
            })?;
        let description = reader.optional_str("description")?;
        let enum_values = match reader.raw("enum") {
            None => None,
            Some(_) if param_type != ParameterType::String => {
                return Err(Error::ValidationError {
                    field: join_path(path, "enum"),
                    reason: format!("enum is only allowed on string parameters, not {param_type}"),
                });
            }
            Some(raw) => Some(read_enum(raw, &join_path(path, "enum"))?),
        };
        let default = reader.raw("default").cloned();
        let items = match reader.raw("items") {
            None => None,
            Some(_) if param_type != ParameterType::Array => {
                return Err(Error::ValidationError {
                    field: join_path(path, "items"),
                    reason: format!("items is only allowed on array parameters, not {param_type}"),
                });
            }
            Some(raw) => Some(Box::new(Self::from_value(
                raw,
                &join_path(path, "items"),
                level + 1,
                config,
            )?)),
        };
        reader.finish(config.unknown_fields)?;

        let parameter = Self {
            param_type,
            description,
            enum_values,
            default,
            items,
        };
        if let Some(default) = &parameter.default {
            check_value(&parameter, default, &join_path(path, "default"), level, config)?;
        }
        Ok(parameter)
    }
}

fn read_enum(raw: &Value, path: &str) -> Result<Vec<String>> {
    let values = raw
        .as_array()
        .ok_or_else(|| type_mismatch(path, "array", raw))?;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| type_mismatch(format!("{path}[{i}]"), "string", v))
        })
        .collect()
}

/// Marker for the only schema type a tool input may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSchemaType {
    /// `"object"`
    #[default]
    Object,
}

/// Input schema of a tool: an object with named parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSchema {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub schema_type: InputSchemaType,
    /// Parameters by name
    #[serde(default)]
    pub properties: BTreeMap<String, McpToolParameter>,
    /// Names of parameters that must be supplied
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl InputSchema {
    /// Returns `true` if `name` must be supplied.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// A tool offered to the AI agent.
///
/// # Examples
///
/// ```
/// use mdxui_mcp::tool::{McpToolDefinition, McpToolParameter};
///
/// let tool = McpToolDefinition::new("database_query", "Run a SQL query")
///     .with_parameter("sql", McpToolParameter::string(), true)
///     .with_parameter("connectionId", McpToolParameter::string(), true);
///
/// assert!(tool.input_schema.is_required("sql"));
/// assert_eq!(tool.input_schema.properties.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolDefinition {
    /// Unique tool name
    pub name: ToolName,
    /// What the tool does
    pub description: String,
    /// Accepted parameters
    pub input_schema: InputSchema,
}

impl McpToolDefinition {
    /// Tool without parameters.
    #[must_use]
    pub fn new(name: impl Into<ToolName>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: InputSchema::default(),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        parameter: McpToolParameter,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required && !self.input_schema.is_required(&name) {
            self.input_schema.required.push(name.clone());
        }
        self.input_schema.properties.insert(name, parameter);
        self
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&McpToolParameter> {
        self.input_schema.properties.get(name)
    }

    /// Parameters with a declared default, as a params map.
    #[must_use]
    pub fn defaults(&self) -> serde_json::Map<String, Value> {
        self.input_schema
            .properties
            .iter()
            .filter_map(|(name, p)| p.default.clone().map(|d| (name.clone(), d)))
            .collect()
    }

    /// Validates an untyped JSON tool definition.
    ///
    /// Checks, in order: the object shape and `name`/`description`,
    /// `inputSchema.type == "object"`, every parameter (recursively through
    /// `items`, bounded by `max_parameter_depth`), that every `required`
    /// name is a declared property, and undeclared fields according to
    /// `config.unknown_fields`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] / [`Error::TypeMismatch`] for absent or
    ///   mistyped fields
    /// - [`Error::ValidationError`] for an unknown parameter type, a
    ///   non-object schema type, a `required` name without a property, a
    ///   default that does not fit its parameter, or a rejected unknown field
    /// - [`Error::RecursionLimit`] when `items` nest too deep
    ///
    /// # Examples
    ///
    /// ```
    /// use mdxui_core::ValidationConfig;
    /// use mdxui_mcp::tool::McpToolDefinition;
    /// use serde_json::json;
    ///
    /// let tool = McpToolDefinition::from_json(
    ///     &json!({
    ///         "name": "list_tables",
    ///         "description": "List tables",
    ///         "inputSchema": {"type": "object", "properties": {}}
    ///     }),
    ///     &ValidationConfig::default(),
    /// )?;
    /// assert_eq!(tool.name.as_str(), "list_tables");
    /// # Ok::<(), mdxui_core::Error>(())
    /// ```
    pub fn from_json(value: &Value, config: &ValidationConfig) -> Result<Self> {
        let mut reader = FieldReader::new(value, "")?;
        let name = reader.required_str("name")?;
        if name.trim().is_empty() {
            return Err(Error::ValidationError {
                field: "name".to_string(),
                reason: "tool name must not be empty".to_string(),
            });
        }
        let description = reader.required_str("description")?;
        let schema_value = reader.raw("inputSchema").ok_or_else(|| Error::MissingField {
            field: "inputSchema".to_string(),
        })?;
        let input_schema = read_input_schema(schema_value, config)?;
        reader.finish(config.unknown_fields)?;

        tracing::debug!(
            tool = %name,
            parameters = input_schema.properties.len(),
            "tool definition validated"
        );
        Ok(Self {
            name: ToolName::new(name),
            description,
            input_schema,
        })
    }

    /// Parses and validates a JSON document. See [`McpToolDefinition::from_json`].
    ///
    /// # Errors
    ///
    /// [`Error::SerializationError`] for malformed JSON, otherwise the errors
    /// of [`McpToolDefinition::from_json`].
    pub fn from_json_str(json: &str, config: &ValidationConfig) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value, config)
    }
}

fn read_input_schema(value: &Value, config: &ValidationConfig) -> Result<InputSchema> {
    const PATH: &str = "inputSchema";
    let mut reader = FieldReader::new(value, PATH)?;

    let schema_type = reader.required_str("type")?;
    if schema_type != "object" {
        return Err(Error::ValidationError {
            field: join_path(PATH, "type"),
            reason: format!("input schema must be of type object, found {schema_type}"),
        });
    }

    let mut properties = BTreeMap::new();
    if let Some(raw) = reader.raw("properties") {
        let path = join_path(PATH, "properties");
        let object = raw
            .as_object()
            .ok_or_else(|| type_mismatch(path.as_str(), "object", raw))?;
        for (name, param) in object {
            let param_path = join_path(&path, name);
            properties.insert(
                name.clone(),
                McpToolParameter::from_value(param, &param_path, 1, config)?,
            );
        }
    }

    let mut required = Vec::new();
    if let Some(raw) = reader.raw("required") {
        let path = join_path(PATH, "required");
        for name in read_enum(raw, &path)? {
            if !properties.contains_key(&name) {
                return Err(Error::ValidationError {
                    field: path,
                    reason: format!("required parameter '{name}' is not declared in properties"),
                });
            }
            if !required.contains(&name) {
                required.push(name);
            }
        }
    }

    reader.finish(config.unknown_fields)?;
    Ok(InputSchema {
        schema_type: InputSchemaType::Object,
        properties,
        required,
    })
}
