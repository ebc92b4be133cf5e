//! Query pane, autocomplete schema and results grid data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::{ColumnDefinition, ColumnReference, TableSchema, TableType};
use crate::{Error, Result};

/// One executed query in the pane history.
///
/// The query editor names the same fields `sql` and `durationMs`; both
/// spellings are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistoryEntry {
    /// SQL text as executed
    #[serde(alias = "sql")]
    pub query: String,
    /// Start of execution
    pub executed_at: DateTime<Utc>,
    /// Execution time in milliseconds, possibly fractional
    #[serde(alias = "durationMs")]
    pub duration: f64,
    /// Rows returned or affected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    /// Whether the query succeeded
    pub success: bool,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryHistoryEntry {
    /// A successful execution started now.
    #[must_use]
    pub fn succeeded(query: impl Into<String>, duration: f64, row_count: u64) -> Self {
        Self {
            query: query.into(),
            executed_at: Utc::now(),
            duration,
            row_count: Some(row_count),
            success: true,
            error: None,
        }
    }

    /// A failed execution started now.
    #[must_use]
    pub fn failed(query: impl Into<String>, duration: f64, error: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            executed_at: Utc::now(),
            duration,
            row_count: None,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// A named, reusable query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    /// Stable id
    pub id: String,
    /// Display name
    pub name: String,
    /// SQL text
    pub query: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the last edit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SavedQuery {
    /// Creates a saved query with a fresh `sq-` id.
    #[must_use]
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: format!("sq-{}", Uuid::new_v4().simple()),
            name: name.into(),
            query: query.into(),
            description: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Replaces the SQL text and stamps `updated_at`.
    pub fn update_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.updated_at = Some(Utc::now());
    }
}

/// State of the query editor pane.
///
/// # Examples
///
/// ```
/// use mdxui_core::query::{QueryHistoryEntry, QueryPaneState};
///
/// let mut pane = QueryPaneState::new("conn-123");
/// pane.query = "SELECT * FROM users".to_string();
///
/// let sql = pane.start_execution()?;
/// pane.finish_execution(QueryHistoryEntry::succeeded(sql, 45.0, 100), None);
///
/// assert!(!pane.is_executing);
/// assert_eq!(pane.history.len(), 1);
/// # Ok::<(), mdxui_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPaneState {
    /// Editor contents
    pub query: String,
    /// Connection the query runs against
    pub selected_database: String,
    /// Whether a query is in flight
    pub is_executing: bool,
    /// Executed queries, oldest first
    pub history: Vec<QueryHistoryEntry>,
    /// Saved queries
    pub saved_queries: Vec<SavedQuery>,
}

impl QueryPaneState {
    /// Empty pane bound to a connection.
    #[must_use]
    pub fn new(selected_database: impl Into<String>) -> Self {
        Self {
            selected_database: selected_database.into(),
            ..Self::default()
        }
    }

    /// Marks the pane busy and returns the query to run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a query is already running or
    /// the editor is blank.
    pub fn start_execution(&mut self) -> Result<String> {
        if self.is_executing {
            return Err(Error::InvalidArgument(
                "a query is already executing".to_string(),
            ));
        }
        if self.query.trim().is_empty() {
            return Err(Error::InvalidArgument("query is empty".to_string()));
        }
        self.is_executing = true;
        Ok(self.query.clone())
    }

    /// Clears the busy flag and appends `entry` to the history, dropping the
    /// oldest entries beyond `limit`.
    pub fn finish_execution(&mut self, entry: QueryHistoryEntry, limit: Option<usize>) {
        self.is_executing = false;
        self.history.push(entry);
        if let Some(limit) = limit
            && self.history.len() > limit
        {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
        }
    }

    /// Looks up a saved query by id.
    #[must_use]
    pub fn saved(&self, id: &str) -> Option<&SavedQuery> {
        self.saved_queries.iter().find(|q| q.id == id)
    }

    /// Loads a saved query into the editor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] for an unknown id.
    pub fn load_saved(&mut self, id: &str) -> Result<()> {
        let query = self
            .saved(id)
            .ok_or_else(|| Error::ResourceNotFound {
                resource: format!("saved query {id}"),
            })?
            .query
            .clone();
        self.query = query;
        Ok(())
    }
}

/// A column as offered to SQL autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteColumn {
    /// Column name
    pub name: String,
    /// SQL type name
    #[serde(rename = "type")]
    pub sql_type: String,
    /// Whether `NULL` may appear
    pub nullable: bool,
    /// Part of the primary key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<bool>,
    /// Single-column foreign key target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ColumnReference>,
}

impl From<&ColumnDefinition> for AutocompleteColumn {
    fn from(column: &ColumnDefinition) -> Self {
        Self {
            name: column.name.clone(),
            sql_type: column.sql_type.clone(),
            nullable: column.nullable,
            primary_key: column.primary_key.then_some(true),
            foreign_key: column.references.clone(),
        }
    }
}

/// Columns of one table or view, for autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutocompleteTable {
    /// Columns in position order
    pub columns: Vec<AutocompleteColumn>,
}

impl From<&TableSchema> for AutocompleteTable {
    fn from(table: &TableSchema) -> Self {
        let mut columns: Vec<AutocompleteColumn> =
            table.columns.iter().map(AutocompleteColumn::from).collect();

        // Table-level single-column constraints fill in missing inline references.
        for fk in &table.foreign_keys {
            if let ([from], [to]) = (fk.columns.as_slice(), fk.referenced_columns.as_slice())
                && let Some(column) = columns.iter_mut().find(|c| &c.name == from)
                && column.foreign_key.is_none()
            {
                column.foreign_key = Some(ColumnReference {
                    table: fk.referenced_table.clone(),
                    column: to.clone(),
                });
            }
        }

        Self { columns }
    }
}

/// Schema summary the query editor uses for SQL autocomplete.
///
/// # Examples
///
/// ```
/// use mdxui_core::query::SchemaDefinition;
/// use mdxui_core::schema::{ColumnDefinition, TableSchema, TableType};
///
/// let users = TableSchema::new("users", TableType::Table)
///     .with_column(ColumnDefinition::new("id", "INTEGER", 0).primary_key());
/// let active = TableSchema::new("active_users", TableType::View);
///
/// let schema = SchemaDefinition::from_tables([&users, &active]);
/// assert_eq!(schema.columns("users").unwrap()[0].name, "id");
/// assert!(schema.views.unwrap().contains_key("active_users"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    /// Tables and virtual tables by name
    pub tables: BTreeMap<String, AutocompleteTable>,
    /// Views by name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<BTreeMap<String, AutocompleteTable>>,
    /// Callable functions and procedures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<String>>,
}

impl SchemaDefinition {
    /// Builds the autocomplete schema from introspected objects.
    ///
    /// Views go to `views`; tables and virtual tables to `tables`.
    #[must_use]
    pub fn from_tables<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a TableSchema>,
    {
        let mut schema = Self::default();
        for table in tables {
            let entry = AutocompleteTable::from(table);
            if table.table_type == TableType::View {
                schema
                    .views
                    .get_or_insert_with(BTreeMap::new)
                    .insert(table.name.clone(), entry);
            } else {
                schema.tables.insert(table.name.clone(), entry);
            }
        }
        schema
    }

    /// Sets the callable functions.
    #[must_use]
    pub fn with_functions<I, S>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions = Some(functions.into_iter().map(Into::into).collect());
        self
    }

    /// Columns of a table, or of a view when no table has that name.
    #[must_use]
    pub fn columns(&self, name: &str) -> Option<&[AutocompleteColumn]> {
        self.tables
            .get(name)
            .or_else(|| self.views.as_ref()?.get(name))
            .map(|table| table.columns.as_slice())
    }

    /// Table, view and function names starting with `prefix`, ignoring
    /// ASCII case, sorted and without duplicates.
    #[must_use]
    pub fn completions(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.to_ascii_lowercase();
        let mut names: Vec<&str> = self
            .tables
            .keys()
            .chain(self.views.iter().flat_map(BTreeMap::keys))
            .chain(self.functions.iter().flatten())
            .map(String::as_str)
            .filter(|name| name.to_ascii_lowercase().starts_with(&prefix))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Result export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values
    Csv,
    /// JSON array of row objects
    Json,
    /// `INSERT` statements
    Sql,
    /// Excel workbook
    Xlsx,
    /// Markdown table
    Markdown,
}

impl ExportFormat {
    /// Every format, in declaration order.
    pub const ALL: [Self; 5] = [Self::Csv, Self::Json, Self::Sql, Self::Xlsx, Self::Markdown];

    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Sql => "sql",
            Self::Xlsx => "xlsx",
            Self::Markdown => "markdown",
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            other => other.as_str(),
        }
    }

    /// MIME type of an exported file.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Sql => "application/sql",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Markdown => "text/markdown",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "invalid export format: '{s}' (expected: csv, json, sql, xlsx, or markdown)"
                ))
            })
    }
}

/// Column header of the results grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// SQL type name
    #[serde(rename = "type")]
    pub sql_type: String,
    /// Whether `NULL` may appear
    pub nullable: bool,
    /// Display width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Whether the grid may sort by this column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    /// Whether cells may be edited inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
}

impl From<&ColumnDefinition> for ColumnMetadata {
    fn from(column: &ColumnDefinition) -> Self {
        Self {
            name: column.name.clone(),
            sql_type: column.sql_type.clone(),
            nullable: column.nullable,
            width: None,
            sortable: Some(true),
            // Primary keys identify the row being edited.
            editable: Some(!column.primary_key),
        }
    }
}

/// Page window over a result set. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// Current page
    pub page: u64,
    /// Rows per page
    pub page_size: u64,
    /// Rows in the whole result set
    pub total_rows: u64,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
            total_rows: 0,
        }
    }
}

impl PaginationState {
    /// Number of pages; an empty result set still has one page.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.page_size == 0 || self.total_rows == 0 {
            return 1;
        }
        self.total_rows.div_ceil(self.page_size)
    }

    /// Row offset of the first row on the current page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Moves to `page`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `page` is outside
    /// `1..=total_pages()`.
    pub fn go_to(&mut self, page: u64) -> Result<()> {
        let total = self.total_pages();
        if page == 0 || page > total {
            return Err(Error::InvalidArgument(format!(
                "page {page} out of range 1..={total}"
            )));
        }
        self.page = page;
        Ok(())
    }

    /// Changes the page size, keeping the first visible row on screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a zero page size.
    pub fn set_page_size(&mut self, page_size: u64) -> Result<()> {
        if page_size == 0 {
            return Err(Error::InvalidArgument(
                "page size must be greater than 0".to_string(),
            ));
        }
        let first_row = self.offset();
        self.page_size = page_size;
        self.page = first_row / page_size + 1;
        Ok(())
    }
}
