//! Component declarations: type tags, placement, data bindings and visibility.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;

/// Grid columns available to a dashboard layout.
pub const GRID_COLUMNS: u16 = 12;

/// One declaratively-configured widget instance within a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Unique within one UI config.
    pub id: String,
    /// Widget type tag.
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Placement hint used by dashboard layouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Widget-specific options, typed per kind at validation time.
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Where the widget's data comes from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataBinding>,
    /// User-triggerable actions bound to the component.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    /// Role and state gates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl Component {
    /// Create a bare component with no options, binding or actions.
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            position: None,
            config: Map::new(),
            data: None,
            actions: Vec::new(),
            visibility: None,
        }
    }

    /// The `title` option, if one is set.
    pub fn title(&self) -> Option<&str> {
        self.config.get("title").and_then(Value::as_str)
    }

    /// Visibility conditions (empty when none are declared).
    pub fn conditions(&self) -> &[Condition] {
        self.visibility
            .as_ref()
            .map(|v| v.conditions.as_slice())
            .unwrap_or_default()
    }

    /// Roles allowed to see the component (empty means everyone).
    pub fn roles(&self) -> &[String] {
        self.visibility
            .as_ref()
            .map(|v| v.roles.as_slice())
            .unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Component kinds
// ─────────────────────────────────────────────────────────────────────────────

/// The closed set of widget types.
///
/// Tags outside the set are preserved as [`ComponentKind::Unknown`] so that
/// lenient configs still load; strict validation rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    Form,
    Table,
    Chart,
    Calendar,
    Kanban,
    Timeline,
    Stats,
    FileUpload,
    DataGrid,
    Wizard,
    Dashboard,
    Unknown(String),
}

impl ComponentKind {
    /// Every recognised kind, in declaration order.
    pub const ALL: [ComponentKind; 11] = [
        ComponentKind::Form,
        ComponentKind::Table,
        ComponentKind::Chart,
        ComponentKind::Calendar,
        ComponentKind::Kanban,
        ComponentKind::Timeline,
        ComponentKind::Stats,
        ComponentKind::FileUpload,
        ComponentKind::DataGrid,
        ComponentKind::Wizard,
        ComponentKind::Dashboard,
    ];

    /// Wire tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            ComponentKind::Form => "form",
            ComponentKind::Table => "table",
            ComponentKind::Chart => "chart",
            ComponentKind::Calendar => "calendar",
            ComponentKind::Kanban => "kanban",
            ComponentKind::Timeline => "timeline",
            ComponentKind::Stats => "stats",
            ComponentKind::FileUpload => "fileUpload",
            ComponentKind::DataGrid => "dataGrid",
            ComponentKind::Wizard => "wizard",
            ComponentKind::Dashboard => "dashboard",
            ComponentKind::Unknown(tag) => tag,
        }
    }

    /// Whether the tag is outside the closed set.
    pub fn is_unknown(&self) -> bool {
        matches!(self, ComponentKind::Unknown(_))
    }
}

impl From<String> for ComponentKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "form" => ComponentKind::Form,
            "table" => ComponentKind::Table,
            "chart" => ComponentKind::Chart,
            "calendar" => ComponentKind::Calendar,
            "kanban" => ComponentKind::Kanban,
            "timeline" => ComponentKind::Timeline,
            "stats" => ComponentKind::Stats,
            "fileUpload" => ComponentKind::FileUpload,
            "dataGrid" => ComponentKind::DataGrid,
            "wizard" => ComponentKind::Wizard,
            "dashboard" => ComponentKind::Dashboard,
            _ => ComponentKind::Unknown(tag),
        }
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Placement
// ─────────────────────────────────────────────────────────────────────────────

/// Grid placement for dashboard layouts.
///
/// `x`/`y` are informational; dashboards flow components in list order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: u16,
    #[serde(default)]
    pub y: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u16>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Data bindings
// ─────────────────────────────────────────────────────────────────────────────

/// Where a bound value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Fetched out-of-band by the hosting page and written into state.
    Api,
    /// Read from `state[stateKey]`.
    State,
    /// The literal `value`.
    Static,
}

/// Binding descriptor for a component's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBinding {
    pub source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Refresh period in milliseconds for `api` bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<u64>,
}

impl DataBinding {
    /// Bind to a state key.
    pub fn state(key: impl Into<String>) -> Self {
        Self {
            source: DataSource::State,
            endpoint: None,
            state_key: Some(key.into()),
            value: None,
            refresh_interval: None,
        }
    }

    /// Bind to a literal value.
    pub fn fixed(value: Value) -> Self {
        Self {
            source: DataSource::Static,
            endpoint: None,
            state_key: None,
            value: Some(value),
            refresh_interval: None,
        }
    }

    /// Bind to a remote endpoint refreshed by the host.
    pub fn api(endpoint: impl Into<String>, refresh_interval: Option<u64>) -> Self {
        Self {
            source: DataSource::Api,
            endpoint: Some(endpoint.into()),
            state_key: None,
            value: None,
            refresh_interval,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Visibility
// ─────────────────────────────────────────────────────────────────────────────

/// Gates deciding whether a component renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    /// Roles allowed to see the component; empty admits everyone.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// State predicates, combined with logical AND.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Comparison applied by a visibility condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Lt,
    Contains,
    Exists,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Contains => "contains",
            Operator::Exists => "exists",
        };
        f.write_str(s)
    }
}

/// A predicate over one state field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}
