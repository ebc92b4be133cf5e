//! Serializable props for the studio connection, schema and query components.
//!
//! Only the data half of each contract lives here. Connection callbacks are
//! expressed by [`ConnectionHandler`](crate::connection::ConnectionHandler)
//! on the host side; editor and grid callbacks stay with the renderer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ConnectionId;
use crate::connection::{AdapterKind, ConnectionConfig, ConnectionRegistry, DatabaseConnection};
use crate::query::{
    ColumnMetadata, ExportFormat, PaginationState, QueryHistoryEntry, QueryPaneState, SavedQuery,
    SchemaDefinition,
};
use crate::schema::{
    ColumnDefinition, ErDiagramConfig, ForeignKeyDefinition, IndexDefinition, SchemaViewState,
    TableSchema,
};

/// Props of the connection manager.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionManagerProps {
    /// Known connections
    pub connections: Vec<DatabaseConnection>,
    /// Currently selected connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_connection: Option<DatabaseConnection>,
    /// Show the "test connection" button
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_test_button: Option<bool>,
    /// Show status badges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_connection_status: Option<bool>,
    /// Extra CSS class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl ConnectionManagerProps {
    /// Snapshot of a registry: every connection plus the active one.
    #[must_use]
    pub fn from_registry(registry: &ConnectionRegistry) -> Self {
        Self {
            connections: registry.list().cloned().collect(),
            active_connection: registry.active().cloned(),
            ..Self::default()
        }
    }
}

/// Props of the adapter-specific connection form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionFormProps {
    /// Adapter whose fields are shown
    pub adapter: AdapterKind,
    /// Values to pre-fill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_config: Option<ConnectionConfig>,
    /// Submission in progress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_loading: Option<bool>,
    /// Error shown above the form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionFormProps {
    /// Form for a new config of `adapter`.
    #[must_use]
    pub const fn new(adapter: AdapterKind) -> Self {
        Self {
            adapter,
            initial_config: None,
            is_loading: None,
            error: None,
        }
    }

    /// Form pre-filled from an existing config.
    #[must_use]
    pub fn editing(config: ConnectionConfig) -> Self {
        Self {
            adapter: config.adapter(),
            initial_config: Some(config),
            is_loading: None,
            error: None,
        }
    }
}

/// Props of the compact connection picker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSelectorProps {
    /// Selectable connections
    pub connections: Vec<DatabaseConnection>,
    /// Selected connection id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<ConnectionId>,
    /// Text shown when nothing is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Picker is read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl ConnectionSelectorProps {
    /// The selected connection, if the id is among `connections`.
    #[must_use]
    pub fn selected(&self) -> Option<&DatabaseConnection> {
        let id = self.selected_id.as_ref()?;
        self.connections.iter().find(|c| &c.id == id)
    }
}

/// Props of the top-level studio shell.
///
/// Extends the generic application shell (sidebar and header toggles) with
/// the active connection, schema view and query pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioShellProps {
    /// Render the sidebar
    pub sidebar: bool,
    /// Render the header
    pub header: bool,
    /// Sidebar starts collapsed
    pub sidebar_collapsed: bool,
    /// Connection the shell is bound to
    pub active_connection: DatabaseConnection,
    /// Schema browser state
    pub schema_view: SchemaViewState,
    /// Query pane state
    pub query_pane: QueryPaneState,
    /// Other connections for the switcher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<DatabaseConnection>>,
}

impl StudioShellProps {
    /// Shell with sidebar and header shown and a fresh query pane bound to
    /// `active_connection`.
    #[must_use]
    pub fn new(active_connection: DatabaseConnection) -> Self {
        let query_pane = QueryPaneState::new(active_connection.id.as_str());
        Self {
            sidebar: true,
            header: true,
            sidebar_collapsed: false,
            active_connection,
            schema_view: SchemaViewState::default(),
            query_pane,
            connections: None,
        }
    }
}

/// Props of the schema browser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaBrowserProps {
    /// Tables, views and virtual tables
    pub tables: Vec<TableSchema>,
    /// Columns of the selected table
    pub columns: Vec<ColumnDefinition>,
    /// Indexes of the selected table
    pub indexes: Vec<IndexDefinition>,
    /// Foreign keys of the selected table
    pub foreign_keys: Vec<ForeignKeyDefinition>,
    /// Show the ER diagram instead of the listing
    pub er_diagram_mode: bool,
    /// ER diagram settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub er_diagram_config: Option<ErDiagramConfig>,
    /// Table shown in the detail pane
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_table: Option<String>,
    /// Tables expanded in tree mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_tables: Option<Vec<String>>,
    /// Table name filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,
    /// Include system tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_system_tables: Option<bool>,
}

impl SchemaBrowserProps {
    /// Browser props for `tables`, with the detail columns filled from the
    /// table selected in `view`.
    #[must_use]
    pub fn from_view(tables: Vec<TableSchema>, view: &SchemaViewState) -> Self {
        let selected = view
            .selected_table
            .as_deref()
            .and_then(|name| tables.iter().find(|t| t.name == name));
        let (columns, indexes, foreign_keys) = selected.map_or_else(Default::default, |t| {
            (t.columns.clone(), t.indexes.clone(), t.foreign_keys.clone())
        });

        Self {
            columns,
            indexes,
            foreign_keys,
            er_diagram_mode: view.view_mode == crate::schema::SchemaViewMode::Diagram,
            selected_table: view.selected_table.clone(),
            expanded_tables: Some(view.expanded_tables.clone()),
            filter_text: Some(view.filter_text.clone()),
            show_system_tables: Some(view.show_system_tables),
            tables,
            er_diagram_config: None,
        }
    }
}

/// Props of the SQL query editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEditorProps {
    /// Editor contents
    pub sql: String,
    /// Schema used for autocomplete
    pub schema: SchemaDefinition,
    /// Executed queries, oldest first
    pub history: Vec<QueryHistoryEntry>,
    /// Reusable queries
    pub saved_queries: Vec<SavedQuery>,
}

impl QueryEditorProps {
    /// Editor props mirroring `pane`, with `schema` for autocomplete.
    #[must_use]
    pub fn from_pane(pane: &QueryPaneState, schema: SchemaDefinition) -> Self {
        Self {
            sql: pane.query.clone(),
            schema,
            history: pane.history.clone(),
            saved_queries: pane.saved_queries.clone(),
        }
    }
}

/// Props of the results grid.
///
/// `rows` holds the whole result set; [`page_rows`](Self::page_rows) is the
/// window the grid shows.
///
/// # Examples
///
/// ```
/// use mdxui_core::props::ResultsPanelProps;
/// use serde_json::json;
///
/// let rows = (1..=120)
///     .map(|n| json!({"id": n}).as_object().cloned().unwrap())
///     .collect();
/// let mut props = ResultsPanelProps::new(rows, Vec::new());
/// props.pagination.go_to(3)?;
///
/// assert_eq!(props.pagination.total_pages(), 3);
/// assert_eq!(props.page_rows().len(), 20);
/// assert_eq!(props.page_rows()[0]["id"], 101);
/// # Ok::<(), mdxui_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPanelProps {
    /// Result rows as column name to value
    pub rows: Vec<Map<String, Value>>,
    /// Column headers
    pub columns: Vec<ColumnMetadata>,
    /// Page window over `rows`
    pub pagination: PaginationState,
    /// Formats offered for export
    pub export_options: Vec<ExportFormat>,
}

impl ResultsPanelProps {
    /// Grid over `rows`, on page one, offering every export format.
    #[must_use]
    pub fn new(rows: Vec<Map<String, Value>>, columns: Vec<ColumnMetadata>) -> Self {
        let pagination = PaginationState {
            total_rows: u64::try_from(rows.len()).unwrap_or(u64::MAX),
            ..PaginationState::default()
        };
        Self {
            rows,
            columns,
            pagination,
            export_options: ExportFormat::ALL.to_vec(),
        }
    }

    /// Rows on the current page; empty when the page lies past the end.
    #[must_use]
    pub fn page_rows(&self) -> &[Map<String, Value>] {
        let len = self.rows.len();
        let start = usize::try_from(self.pagination.offset()).map_or(len, |s| s.min(len));
        let size = usize::try_from(self.pagination.page_size).unwrap_or(usize::MAX);
        let end = start.saturating_add(size).min(len);
        &self.rows[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionStatus, DatabaseType, TursoConnectionConfig};
    use crate::schema::{SchemaViewMode, TableType};
    use crate::DurableObjectId;
    use serde_json::json;

    fn connection(id: &str) -> DatabaseConnection {
        DatabaseConnection::new(
            ConnectionId::new(id),
            "Main",
            DatabaseType::Sqlite,
            DurableObjectId::new("do-1"),
        )
    }

    #[test]
    fn test_manager_props_from_registry() {
        let mut registry = ConnectionRegistry::new();
        let id = registry
            .register_config("Edge", TursoConnectionConfig::new("libsql://x", "t").into())
            .id
            .clone();
        registry.select(&id).unwrap();

        let props = ConnectionManagerProps::from_registry(&registry);
        assert_eq!(props.connections.len(), 1);
        assert_eq!(props.active_connection.unwrap().id, id);
    }

    #[test]
    fn test_form_props_editing() {
        let props = ConnectionFormProps::editing(TursoConnectionConfig::new("libsql://x", "t").into());
        assert_eq!(props.adapter, AdapterKind::Turso);

        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["adapter"], "turso");
        assert_eq!(json["initialConfig"]["adapter"], "turso");
    }

    #[test]
    fn test_selector_selected() {
        let props = ConnectionSelectorProps {
            connections: vec![connection("conn-1"), connection("conn-2")],
            selected_id: Some(ConnectionId::new("conn-2")),
            ..ConnectionSelectorProps::default()
        };
        assert_eq!(props.selected().unwrap().id.as_str(), "conn-2");
    }

    #[test]
    fn test_studio_shell_wire_format() {
        let props: StudioShellProps = serde_json::from_value(json!({
            "sidebar": true,
            "header": true,
            "sidebarCollapsed": false,
            "activeConnection": {
                "id": "conn-1",
                "name": "Main",
                "type": "d1",
                "status": "connected",
                "durableObjectId": "do-1"
            },
            "schemaView": {
                "expandedTables": [],
                "viewMode": "tree",
                "filterText": "",
                "showSystemTables": false
            },
            "queryPane": {
                "query": "",
                "selectedDatabase": "conn-1",
                "isExecuting": false,
                "history": [],
                "savedQueries": []
            }
        }))
        .unwrap();

        assert_eq!(props.active_connection.status, ConnectionStatus::Connected);
        assert!(props.connections.is_none());

        let fresh = StudioShellProps::new(connection("conn-9"));
        assert_eq!(fresh.query_pane.selected_database, "conn-9");
    }

    #[test]
    fn test_schema_browser_from_view() {
        let users = TableSchema::new("users", TableType::Table)
            .with_column(ColumnDefinition::new("id", "INTEGER", 0).primary_key());
        let view = SchemaViewState {
            selected_table: Some("users".to_string()),
            view_mode: SchemaViewMode::Diagram,
            ..SchemaViewState::default()
        };

        let props = SchemaBrowserProps::from_view(vec![users], &view);
        assert_eq!(props.columns.len(), 1);
        assert!(props.er_diagram_mode);
        assert_eq!(serde_json::to_value(&props).unwrap()["erDiagramMode"], true);
    }

    fn rows(count: u64) -> Vec<Map<String, Value>> {
        (0..count)
            .map(|n| json!({"id": n, "name": format!("user{n}")}).as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_query_editor_from_pane() {
        let mut pane = QueryPaneState::new("conn-1");
        pane.query = "SELECT * FROM users".to_string();
        pane.finish_execution(QueryHistoryEntry::succeeded("SELECT 1", 4.5, 1), None);
        pane.saved_queries.push(SavedQuery::new("All users", "SELECT * FROM users"));

        let users = TableSchema::new("users", TableType::Table)
            .with_column(ColumnDefinition::new("id", "INTEGER", 0).primary_key());
        let props =
            QueryEditorProps::from_pane(&pane, SchemaDefinition::from_tables([&users]));

        assert_eq!(props.sql, "SELECT * FROM users");
        assert_eq!(props.history.len(), 1);
        assert_eq!(props.saved_queries.len(), 1);

        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["sql"], "SELECT * FROM users");
        assert_eq!(json["schema"]["tables"]["users"]["columns"][0]["primaryKey"], true);
        assert_eq!(json["savedQueries"][0]["name"], "All users");
    }

    #[test]
    fn test_results_panel_pagination() {
        let columns = vec![ColumnMetadata::from(&ColumnDefinition::new("id", "INTEGER", 0))];
        let mut props = ResultsPanelProps::new(rows(120), columns);

        assert_eq!(props.pagination.total_rows, 120);
        assert_eq!(props.pagination.total_pages(), 3);
        assert_eq!(props.page_rows().len(), 50);

        props.pagination.go_to(3).unwrap();
        assert_eq!(props.page_rows().len(), 20);
        assert_eq!(props.page_rows()[0]["id"], 100);

        // A page beyond the rows held yields nothing instead of panicking.
        props.pagination.total_rows = 1000;
        props.pagination.go_to(10).unwrap();
        assert!(props.page_rows().is_empty());

        assert!(ResultsPanelProps::default().page_rows().is_empty());
    }

    #[test]
    fn test_results_panel_wire_format() {
        let props: ResultsPanelProps = serde_json::from_value(json!({
            "rows": [{"id": 1, "email": null}],
            "columns": [
                {"name": "id", "type": "INTEGER", "nullable": false},
                {"name": "email", "type": "TEXT", "nullable": true, "width": 240}
            ],
            "pagination": {"page": 1, "pageSize": 25, "totalRows": 1},
            "exportOptions": ["csv", "json", "markdown"]
        }))
        .unwrap();

        assert_eq!(props.columns[1].width, Some(240));
        assert_eq!(
            props.export_options,
            [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Markdown]
        );
        assert_eq!(props.page_rows().len(), 1);

        let fresh = ResultsPanelProps::new(rows(2), Vec::new());
        let json = serde_json::to_value(&fresh).unwrap();
        assert_eq!(json["exportOptions"], json!(["csv", "json", "sql", "xlsx", "markdown"]));
        assert_eq!(json["pagination"]["totalRows"], 2);
    }
}
