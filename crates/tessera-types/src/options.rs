//! Strongly-typed widget options, one structure per component kind.
//!
//! Options are parsed from a component's loose `config` object when the UI
//! config is validated. Keys a structure does not recognise are preserved in
//! its `extra` bag so configs can carry host-specific extensions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::{Action, ActionStyle};
use crate::component::{ComponentKind, Visibility};
use crate::error::{ConfigError, Result};

/// Typed options for one component.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentOptions {
    Form(FormOptions),
    Table(TableOptions),
    Chart(ChartOptions),
    Calendar(CalendarOptions),
    Kanban(KanbanOptions),
    Timeline(TimelineOptions),
    Stats(StatsOptions),
    FileUpload(FileUploadOptions),
    DataGrid(TableOptions),
    Wizard(WizardOptions),
    Dashboard(DashboardOptions),
    /// Options of a component whose type is outside the closed set.
    Generic(Map<String, Value>),
}

impl ComponentOptions {
    /// Parse a component's raw config according to its kind.
    pub fn parse(component_id: &str, kind: &ComponentKind, config: &Map<String, Value>) -> Result<Self> {
        let value = Value::Object(config.clone());
        let parsed = match kind {
            ComponentKind::Form => serde_json::from_value(value).map(ComponentOptions::Form),
            ComponentKind::Table => serde_json::from_value(value).map(ComponentOptions::Table),
            ComponentKind::Chart => serde_json::from_value(value).map(ComponentOptions::Chart),
            ComponentKind::Calendar => serde_json::from_value(value).map(ComponentOptions::Calendar),
            ComponentKind::Kanban => serde_json::from_value(value).map(ComponentOptions::Kanban),
            ComponentKind::Timeline => serde_json::from_value(value).map(ComponentOptions::Timeline),
            ComponentKind::Stats => serde_json::from_value(value).map(ComponentOptions::Stats),
            ComponentKind::FileUpload => {
                serde_json::from_value(value).map(ComponentOptions::FileUpload)
            }
            ComponentKind::DataGrid => serde_json::from_value(value).map(ComponentOptions::DataGrid),
            ComponentKind::Wizard => serde_json::from_value(value).map(ComponentOptions::Wizard),
            ComponentKind::Dashboard => {
                serde_json::from_value(value).map(ComponentOptions::Dashboard)
            }
            ComponentKind::Unknown(_) => return Ok(ComponentOptions::Generic(config.clone())),
        };

        parsed.map_err(|e| ConfigError::InvalidOptions {
            component: component_id.to_string(),
            kind: kind.to_string(),
            message: e.to_string(),
        })
    }

    /// The title shared by every options structure.
    pub fn title(&self) -> Option<&str> {
        match self {
            ComponentOptions::Form(o) => o.title.as_deref(),
            ComponentOptions::Table(o) | ComponentOptions::DataGrid(o) => o.title.as_deref(),
            ComponentOptions::Chart(o) => o.title.as_deref(),
            ComponentOptions::Calendar(o) => o.title.as_deref(),
            ComponentOptions::Kanban(o) => o.title.as_deref(),
            ComponentOptions::Timeline(o) => o.title.as_deref(),
            ComponentOptions::Stats(o) => o.title.as_deref(),
            ComponentOptions::FileUpload(o) => o.title.as_deref(),
            ComponentOptions::Wizard(o) => o.title.as_deref(),
            ComponentOptions::Dashboard(o) => o.title.as_deref(),
            ComponentOptions::Generic(map) => map.get("title").and_then(Value::as_str),
        }
    }

    /// Actions embedded in the options (forms declare their submit actions here).
    pub fn embedded_actions(&self) -> &[Action] {
        match self {
            ComponentOptions::Form(o) => &o.actions,
            _ => &[],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Form
// ─────────────────────────────────────────────────────────────────────────────

/// Input control type of a form field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Number,
    Email,
    Password,
    Date,
    Select,
    Checkbox,
    FileUpload,
    #[serde(other)]
    Other,
}

/// One choice of a select field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
}

/// A form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Upload size limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Table / data grid
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Date,
    Status,
    Actions,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub field: String,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ColumnKind,
}

impl ColumnSpec {
    /// Header text, falling back to the field name.
    pub fn header(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: Option<String>,
}

/// A per-row action naming a host handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowAction {
    pub label: String,
    pub handler: String,
    #[serde(default)]
    pub style: Option<ActionStyle>,
}

/// Options shared by `table` and `dataGrid`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default, rename = "actions", alias = "rowActions")]
    pub row_actions: Vec<RowAction>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Chart
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Area,
    Pie,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub chart_type: ChartKind,
    #[serde(default = "default_x_key")]
    pub x_key: String,
    #[serde(default = "default_y_key")]
    pub y_key: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_x_key() -> String {
    "label".to_string()
}

fn default_y_key() -> String {
    "value".to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Calendar / timeline / kanban
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_date_field")]
    pub date_field: String,
    #[serde(default = "default_title_field")]
    pub title_field: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_time_field")]
    pub time_field: String,
    #[serde(default = "default_label_field")]
    pub label_field: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KanbanColumn {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_status_field")]
    pub status_field: String,
    #[serde(default = "default_title_field")]
    pub title_field: String,
    #[serde(default)]
    pub columns: Vec<KanbanColumn>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_date_field() -> String {
    "date".to_string()
}

fn default_title_field() -> String {
    "title".to_string()
}

fn default_time_field() -> String {
    "timestamp".to_string()
}

fn default_label_field() -> String {
    "label".to_string()
}

fn default_status_field() -> String {
    "status".to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Stats / upload / wizard / dashboard
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatFormat {
    #[default]
    Number,
    Percent,
    Duration,
    Currency,
    #[serde(other)]
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSpec {
    pub label: String,
    pub key: String,
    #[serde(default)]
    pub format: StatFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub stats: Vec<StatSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub accept: Option<String>,
    #[serde(default)]
    pub max_size: Option<u64>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub steps: Vec<WizardStep>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_form_fields_and_embedded_actions() {
        let config = object(json!({
            "title": "Process New PDF",
            "fields": [
                {
                    "id": "source_type",
                    "type": "select",
                    "label": "Source Type",
                    "options": [{ "value": "upload", "label": "Upload File" }],
                    "required": true
                },
                { "id": "file_upload", "type": "fileUpload", "accept": ".pdf", "maxSize": 10485760 }
            ],
            "actions": [{
                "id": "process",
                "label": "Process PDF",
                "handler": { "type": "api", "config": { "method": "POST", "url": "/process" } }
            }]
        }));

        let options = ComponentOptions::parse("file-input", &ComponentKind::Form, &config).unwrap();
        let ComponentOptions::Form(form) = &options else {
            panic!("expected form options");
        };
        assert_eq!(form.fields.len(), 2);
        assert_eq!(form.fields[0].kind, FieldKind::Select);
        assert!(form.fields[0].required);
        assert_eq!(form.fields[1].max_size, Some(10_485_760));
        assert_eq!(options.embedded_actions()[0].id, "process");
        assert_eq!(options.title(), Some("Process New PDF"));
    }

    #[test]
    fn test_unknown_keys_land_in_extra() {
        let config = object(json!({ "title": "Stats", "refreshLabel": "live" }));
        let options = ComponentOptions::parse("s", &ComponentKind::Stats, &config).unwrap();
        let ComponentOptions::Stats(stats) = options else {
            panic!("expected stats options");
        };
        assert_eq!(stats.extra["refreshLabel"], json!("live"));
    }

    #[test]
    fn test_data_grid_row_actions_name_handlers() {
        let config = object(json!({
            "columns": [{ "field": "status", "header": "Status", "type": "status" }, { "field": "filename" }],
            "actions": [{ "label": "Retry", "handler": "retryProcess", "style": "secondary" }]
        }));
        let options = ComponentOptions::parse("grid", &ComponentKind::DataGrid, &config).unwrap();
        let ComponentOptions::DataGrid(grid) = options else {
            panic!("expected data grid options");
        };
        assert_eq!(grid.columns[0].kind, ColumnKind::Status);
        assert_eq!(grid.columns[1].header(), "filename");
        assert_eq!(grid.row_actions[0].handler, "retryProcess");
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let config = object(json!({ "stats": [{ "label": "Missing key" }] }));
        let err = ComponentOptions::parse("s", &ComponentKind::Stats, &config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOptions { ref component, .. } if component == "s"));
    }

    #[test]
    fn test_unknown_kind_keeps_generic_bag() {
        let config = object(json!({ "title": "Heat" }));
        let kind = ComponentKind::Unknown("heatmap".to_string());
        let options = ComponentOptions::parse("h", &kind, &config).unwrap();
        assert_eq!(options.title(), Some("Heat"));
        assert!(matches!(options, ComponentOptions::Generic(_)));
    }

    #[test]
    fn test_chart_defaults() {
        let options = ComponentOptions::parse("c", &ComponentKind::Chart, &Map::new()).unwrap();
        let ComponentOptions::Chart(chart) = options else {
            panic!("expected chart options");
        };
        assert_eq!(chart.chart_type, ChartKind::Bar);
        assert_eq!(chart.x_key, "label");
        assert_eq!(chart.y_key, "value");
    }
}
