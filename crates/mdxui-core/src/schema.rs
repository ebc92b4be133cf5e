//! Schema browser data model.
//!
//! Tables, columns, indexes and foreign keys as introspected from a
//! connected database, plus the view state of the schema browser and its
//! ER diagram.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Kind of schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableType {
    /// Regular table
    #[default]
    Table,
    /// View backed by a `SELECT`
    View,
    /// Virtual table (FTS, R-tree, ...)
    Virtual,
}

/// Column referenced by a single-column foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReference {
    /// Referenced table
    pub table: String,
    /// Referenced column
    pub column: String,
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Declared SQL type, e.g. `INTEGER`
    #[serde(rename = "type")]
    pub sql_type: String,
    /// Whether `NULL` is allowed
    pub nullable: bool,
    /// Part of the primary key
    pub primary_key: bool,
    /// `AUTOINCREMENT` key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    /// Default value expression, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Zero-based ordinal position
    pub position: u32,
    /// Target of an inline foreign key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ColumnReference>,
}

impl ColumnDefinition {
    /// Creates a nullable, non-key column.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            primary_key: false,
            auto_increment: None,
            default_value: None,
            position,
            references: None,
        }
    }

    /// Marks the column as the (non-null) primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Marks the column `NOT NULL`.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Adds a foreign key reference.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ColumnReference {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name
    pub name: String,
    /// Indexed columns, in index order
    pub columns: Vec<String>,
    /// `UNIQUE` index
    pub unique: bool,
    /// Partial index (has a `WHERE` clause)
    pub partial: bool,
    /// Predicate of a partial index
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
}

impl IndexDefinition {
    /// Checks that the index names at least one column and that a partial
    /// index carries its predicate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(invalid(
                format!("indexes.{}.columns", self.name),
                "index must cover at least one column",
            ));
        }
        if self.partial && self.where_clause.is_none() {
            return Err(invalid(
                format!("indexes.{}.where", self.name),
                "partial index requires a WHERE clause",
            ));
        }
        Ok(())
    }
}

/// `ON DELETE` / `ON UPDATE` behaviour of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReferentialAction {
    /// Propagate the change
    #[serde(rename = "CASCADE")]
    Cascade,
    /// Set referencing columns to `NULL`
    #[serde(rename = "SET NULL")]
    SetNull,
    /// Set referencing columns to their defaults
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
    /// Refuse the change immediately
    #[serde(rename = "RESTRICT")]
    Restrict,
    /// Refuse the change at statement end
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
}

impl ReferentialAction {
    /// SQL spelling of the action.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A (possibly compound) foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDefinition {
    /// Constraint name; SQLite allows anonymous constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Referencing columns
    pub columns: Vec<String>,
    /// Referenced table
    pub referenced_table: String,
    /// Referenced columns, paired with `columns` by position
    pub referenced_columns: Vec<String>,
    /// Action when the referenced row is deleted
    pub on_delete: ReferentialAction,
    /// Action when the referenced key is updated
    pub on_update: ReferentialAction,
}

impl ForeignKeyDefinition {
    /// Checks that both column lists are non-empty and of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] on `columns` or
    /// `referencedColumns`.
    pub fn validate(&self) -> Result<()> {
        let label = self.name.as_deref().unwrap_or(&self.referenced_table);
        if self.columns.is_empty() {
            return Err(invalid(
                format!("foreignKeys.{label}.columns"),
                "foreign key must have at least one column",
            ));
        }
        if self.columns.len() != self.referenced_columns.len() {
            return Err(invalid(
                format!("foreignKeys.{label}.referencedColumns"),
                &format!(
                    "expected {} referenced column(s), found {}",
                    self.columns.len(),
                    self.referenced_columns.len()
                ),
            ));
        }
        Ok(())
    }

    /// Pairs of `(column, referenced column)`.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .zip(&self.referenced_columns)
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }
}

/// An introspected table, view or virtual table.
///
/// # Examples
///
/// ```
/// use mdxui_core::schema::{ColumnDefinition, TableSchema, TableType};
///
/// let table = TableSchema::new("posts", TableType::Table)
///     .with_column(ColumnDefinition::new("id", "INTEGER", 0).primary_key())
///     .with_column(ColumnDefinition::new("user_id", "INTEGER", 1).references("users", "id"));
///
/// assert!(table.validate().is_ok());
/// assert_eq!(table.primary_key().collect::<Vec<_>>(), ["id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Object name
    pub name: String,
    /// Table, view or virtual table
    #[serde(rename = "type")]
    pub table_type: TableType,
    /// Approximate row count, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    /// Columns in position order
    pub columns: Vec<ColumnDefinition>,
    /// Indexes
    pub indexes: Vec<IndexDefinition>,
    /// Foreign key constraints
    pub foreign_keys: Vec<ForeignKeyDefinition>,
    /// `CREATE` statement, mostly useful for views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

impl TableSchema {
    /// Creates an empty schema object.
    #[must_use]
    pub fn new(name: impl Into<String>, table_type: TableType) -> Self {
        Self {
            name: name.into(),
            table_type,
            row_count: None,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            sql: None,
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends an index.
    #[must_use]
    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// Appends a foreign key.
    #[must_use]
    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyDefinition) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Finds a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the primary key columns, in position order.
    pub fn primary_key(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
    }

    /// Returns `true` for SQLite internal tables (`sqlite_*`) and Cloudflare
    /// bookkeeping tables (`_cf_*`).
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.name.starts_with("sqlite_") || self.name.starts_with("_cf_")
    }

    /// Validates every index and foreign key, and that indexes and foreign
    /// keys only name columns of this table.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::ValidationError`] found.
    pub fn validate(&self) -> Result<()> {
        for index in &self.indexes {
            index.validate()?;
            self.check_columns_exist(&index.columns, &format!("indexes.{}", index.name))?;
        }
        for fk in &self.foreign_keys {
            fk.validate()?;
            let label = fk.name.as_deref().unwrap_or(&fk.referenced_table);
            self.check_columns_exist(&fk.columns, &format!("foreignKeys.{label}"))?;
        }
        Ok(())
    }

    fn check_columns_exist(&self, columns: &[String], path: &str) -> Result<()> {
        // Views and virtual tables are often introspected without columns.
        if self.columns.is_empty() {
            return Ok(());
        }
        match columns.iter().find(|name| self.column(name).is_none()) {
            Some(missing) => Err(invalid(
                format!("{}.{path}.columns", self.name),
                &format!("unknown column '{missing}'"),
            )),
            None => Ok(()),
        }
    }
}

/// Level of detail of the ER diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErDiagramMode {
    /// Table names and keys
    #[default]
    Simple,
    /// Every column
    Detailed,
    /// Only tables that take part in a relationship
    RelationshipsOnly,
}

/// Node placement strategy of the ER diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErDiagramLayout {
    /// Layered by reference direction
    #[default]
    Hierarchical,
    /// Force-directed
    Force,
    /// Fixed grid
    Grid,
}

/// ER diagram display settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErDiagramConfig {
    /// Level of detail
    pub mode: ErDiagramMode,
    /// Render column types next to names
    pub show_column_types: bool,
    /// Render indexes
    pub show_indexes: bool,
    /// Placement strategy
    pub layout: ErDiagramLayout,
}

/// How the schema browser lists tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaViewMode {
    /// Expandable tree of tables and columns
    #[default]
    Tree,
    /// Flat list of tables
    List,
    /// ER diagram
    Diagram,
}

/// Schema browser view state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaViewState {
    /// Table shown in the detail pane
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_table: Option<String>,
    /// Tables expanded in tree mode
    pub expanded_tables: Vec<String>,
    /// Listing mode
    pub view_mode: SchemaViewMode,
    /// Case-insensitive table name filter
    pub filter_text: String,
    /// Include `sqlite_*` and `_cf_*` tables
    pub show_system_tables: bool,
}

impl SchemaViewState {
    /// Expands a collapsed table or collapses an expanded one. Returns the
    /// new expansion state.
    pub fn toggle_expanded(&mut self, table: &str) -> bool {
        if let Some(pos) = self.expanded_tables.iter().position(|t| t == table) {
            self.expanded_tables.remove(pos);
            false
        } else {
            self.expanded_tables.push(table.to_string());
            true
        }
    }

    /// Returns `true` if `table` passes the system-table toggle and the
    /// case-insensitive name filter.
    #[must_use]
    pub fn is_visible(&self, table: &TableSchema) -> bool {
        if table.is_system() && !self.show_system_tables {
            return false;
        }
        self.filter_text.is_empty()
            || table
                .name
                .to_lowercase()
                .contains(&self.filter_text.to_lowercase())
    }

    /// Tables from `tables` that are currently visible.
    pub fn visible<'a>(&'a self, tables: &'a [TableSchema]) -> impl Iterator<Item = &'a TableSchema> {
        tables.iter().filter(|t| self.is_visible(t))
    }
}

fn invalid(field: String, reason: &str) -> Error {
    Error::ValidationError {
        field,
        reason: reason.to_string(),
    }
}
