//! Widget framework and the built-in widget set.
//!
//! This module defines the [`Widget`] trait every component renderer
//! implements, the [`WidgetRegistry`] that dispatches a component type to its
//! widget, and one built-in widget per recognised component type.
//!
//! Widgets are pure: given the component, its typed options, its resolved
//! data, the session state and the component's uncommitted local input, they
//! produce a [`WidgetView`] describing what to draw. Hosts (the terminal UI,
//! the `render` command) decide how to draw it.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_render::{Widget, WidgetContext, WidgetRegistry, WidgetView};
//! use tessera_types::ComponentKind;
//!
//! struct MapWidget;
//!
//! impl Widget for MapWidget {
//!     fn kind(&self) -> ComponentKind { ComponentKind::Unknown("map".into()) }
//!     fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
//!         WidgetView::Raw { data: ctx.data.cloned().unwrap_or_default() }
//!     }
//! }
//!
//! let mut registry = WidgetRegistry::builtin();
//! registry.register(MapWidget);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tessera_types::{
    ActionStyle, CalendarOptions, ChartKind, ChartOptions, ColumnKind, Component, ComponentKind,
    ComponentOptions, DashboardOptions, FieldKind, FileUploadOptions, FormOptions, KanbanOptions,
    SelectOption, StatFormat, State, StatsOptions, TableOptions, TimelineOptions, WizardOptions,
};

use crate::visibility::evaluate_in;

// ─────────────────────────────────────────────────────────────────────────────
// Widget Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a widget may read while rendering.
#[derive(Debug, Clone, Copy)]
pub struct WidgetContext<'a> {
    /// The component being rendered.
    pub component: &'a Component,
    /// Options parsed for the component's type.
    pub options: &'a ComponentOptions,
    /// The component's resolved data binding, if any.
    pub data: Option<&'a Value>,
    /// Current session state.
    pub state: &'a State,
    /// Uncommitted input (form values, filters, selections).
    pub local_input: &'a Map<String, Value>,
}

/// Renderer for one component type.
pub trait Widget: Send + Sync {
    /// The component type this widget renders.
    fn kind(&self) -> ComponentKind;

    /// Produce the view for one component instance.
    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView;
}

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

/// Host-independent description of a rendered widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "camelCase")]
pub enum WidgetView {
    Form {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        fields: Vec<FieldView>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        /// Rows matching the active filters, before pagination.
        total_rows: usize,
        filters: Vec<FilterView>,
        row_actions: Vec<RowActionView>,
        /// The records behind `rows`, for row actions.
        #[serde(skip)]
        records: Vec<Value>,
    },
    Chart {
        chart_type: ChartKind,
        points: Vec<ChartPoint>,
    },
    Calendar {
        entries: Vec<DatedEntry>,
    },
    Kanban {
        lanes: Vec<KanbanLane>,
    },
    Timeline {
        events: Vec<DatedEntry>,
    },
    Stats {
        stats: Vec<StatView>,
    },
    FileUpload {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        accept: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_size: Option<u64>,
        multiple: bool,
        selected: Vec<String>,
    },
    Wizard {
        steps: Vec<WizardStepView>,
        current: usize,
    },
    Dashboard {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        entries: Vec<(String, String)>,
    },
    /// Unformatted data, for widgets that draw the binding as-is.
    Raw { data: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub id: String,
    pub kind: FieldKind,
    pub label: String,
    pub required: bool,
    /// Local input if present, otherwise the committed state value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterView {
    pub field: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowActionView {
    pub label: String,
    pub handler: String,
    pub style: ActionStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// A labelled entry keyed by a date or timestamp string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedEntry {
    pub at: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KanbanLane {
    pub id: String,
    pub title: String,
    pub cards: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatView {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardStepView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Widget Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Maps component types to widgets.
///
/// A type with no registered widget renders nothing.
#[derive(Default, Clone)]
pub struct WidgetRegistry {
    widgets: HashMap<ComponentKind, Arc<dyn Widget>>,
}

impl WidgetRegistry {
    /// Create a registry with no widgets.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in widget for every recognised type.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(FormWidget);
        registry.register(TableWidget::table());
        registry.register(TableWidget::data_grid());
        registry.register(ChartWidget);
        registry.register(CalendarWidget);
        registry.register(KanbanWidget);
        registry.register(TimelineWidget);
        registry.register(StatsWidget);
        registry.register(FileUploadWidget);
        registry.register(WizardWidget);
        registry.register(DashboardWidget);
        registry
    }

    /// Register a widget, replacing any widget for the same type.
    pub fn register<W: Widget + 'static>(&mut self, widget: W) {
        self.widgets.insert(widget.kind(), Arc::new(widget));
    }

    /// Register a widget from an Arc.
    pub fn register_arc(&mut self, widget: Arc<dyn Widget>) {
        self.widgets.insert(widget.kind(), widget);
    }

    /// Remove the widget for a type.
    pub fn unregister(&mut self, kind: &ComponentKind) -> Option<Arc<dyn Widget>> {
        self.widgets.remove(kind)
    }

    /// Get the widget for a type.
    pub fn get(&self, kind: &ComponentKind) -> Option<Arc<dyn Widget>> {
        self.widgets.get(kind).cloned()
    }

    /// Check if a type has a widget.
    pub fn contains(&self, kind: &ComponentKind) -> bool {
        self.widgets.contains_key(kind)
    }

    /// Get all registered types.
    pub fn kinds(&self) -> Vec<&ComponentKind> {
        self.widgets.keys().collect()
    }

    /// Get the number of registered widgets.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Render a component, or `None` when its type has no widget.
    pub fn render(&self, ctx: &WidgetContext<'_>) -> Option<WidgetView> {
        let Some(widget) = self.widgets.get(&ctx.component.kind) else {
            tracing::warn!(
                component = %ctx.component.id,
                kind = %ctx.component.kind,
                "No widget registered for component type, rendering nothing"
            );
            return None;
        };
        Some(widget.render(ctx))
    }
}

impl std::fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.widgets.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("WidgetRegistry").field("kinds", &kinds).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Display form of a JSON value: strings unquoted, null empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn field_text(row: &Value, field: &str) -> String {
    row.get(field).map(display_value).unwrap_or_default()
}

/// The binding as a list of records. Objects wrapping an `items` or `rows`
/// array are unwrapped.
fn records(data: Option<&Value>) -> &[Value] {
    match data {
        Some(Value::Array(items)) => items,
        Some(Value::Object(obj)) => obj
            .get("items")
            .or_else(|| obj.get("rows"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

/// Widget paired with options of another type; only reachable through a
/// custom registration.
fn mismatched(ctx: &WidgetContext<'_>) -> WidgetView {
    tracing::debug!(
        component = %ctx.component.id,
        kind = %ctx.component.kind,
        "Widget options do not match its type, rendering raw data"
    );
    WidgetView::Raw {
        data: ctx.data.cloned().unwrap_or_default(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in widgets
// ─────────────────────────────────────────────────────────────────────────────

/// Form inputs. Field visibility sees committed state overlaid with the
/// component's local input.
pub struct FormWidget;

impl FormWidget {
    fn view(options: &FormOptions, ctx: &WidgetContext<'_>) -> WidgetView {
        let mut scope = ctx.state.as_map().clone();
        scope.extend(ctx.local_input.iter().map(|(k, v)| (k.clone(), v.clone())));

        let fields = options
            .fields
            .iter()
            .filter(|field| {
                field
                    .visibility
                    .as_ref()
                    .is_none_or(|v| evaluate_in(&v.conditions, &scope))
            })
            .map(|field| FieldView {
                id: field.id.clone(),
                kind: field.kind,
                label: if field.label.is_empty() {
                    field.id.clone()
                } else {
                    field.label.clone()
                },
                required: field.required,
                value: ctx
                    .local_input
                    .get(&field.id)
                    .or_else(|| ctx.state.get(&field.id))
                    .cloned(),
                options: field.options.clone(),
                placeholder: field.placeholder.clone(),
                accept: field.accept.clone(),
                max_size: field.max_size,
            })
            .collect();

        WidgetView::Form {
            description: options.description.clone(),
            fields,
        }
    }
}

impl Widget for FormWidget {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Form
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        match ctx.options {
            ComponentOptions::Form(options) => Self::view(options, ctx),
            _ => mismatched(ctx),
        }
    }
}

/// Tabular records with filters, pagination and per-row actions.
/// Shared by `table` and `dataGrid`.
pub struct TableWidget {
    kind: ComponentKind,
}

impl TableWidget {
    pub fn table() -> Self {
        Self {
            kind: ComponentKind::Table,
        }
    }

    pub fn data_grid() -> Self {
        Self {
            kind: ComponentKind::DataGrid,
        }
    }

    fn view(options: &TableOptions, ctx: &WidgetContext<'_>) -> WidgetView {
        let filters: Vec<FilterView> = options
            .filters
            .iter()
            .map(|f| FilterView {
                field: f.field.clone(),
                label: f.label.clone().unwrap_or_else(|| f.field.clone()),
                value: ctx.local_input.get(&f.field).map(display_value).unwrap_or_default(),
            })
            .collect();

        let row_actions: Vec<RowActionView> = options
            .row_actions
            .iter()
            .map(|a| RowActionView {
                label: a.label.clone(),
                handler: a.handler.clone(),
                style: a.style.unwrap_or(ActionStyle::Secondary),
            })
            .collect();

        let matching: Vec<&Value> = records(ctx.data)
            .iter()
            .filter(|row| {
                filters.iter().all(|f| {
                    f.value.is_empty()
                        || field_text(row, &f.field)
                            .to_lowercase()
                            .contains(&f.value.to_lowercase())
                })
            })
            .collect();
        let total_rows = matching.len();

        let action_labels = row_actions
            .iter()
            .map(|a| a.label.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        let page: Vec<&Value> = matching
            .into_iter()
            .take(options.page_size.unwrap_or(usize::MAX))
            .collect();
        let rows = page
            .iter()
            .map(|row| {
                options
                    .columns
                    .iter()
                    .map(|column| match column.kind {
                        ColumnKind::Actions => action_labels.clone(),
                        _ => field_text(row, &column.field),
                    })
                    .collect()
            })
            .collect();

        WidgetView::Table {
            headers: options.columns.iter().map(|c| c.header().to_string()).collect(),
            rows,
            total_rows,
            filters,
            row_actions,
            records: page.into_iter().cloned().collect(),
        }
    }
}

impl Widget for TableWidget {
    fn kind(&self) -> ComponentKind {
        self.kind.clone()
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        match ctx.options {
            ComponentOptions::Table(options) | ComponentOptions::DataGrid(options) => {
                Self::view(options, ctx)
            }
            _ => mismatched(ctx),
        }
    }
}

/// Series of labelled numeric points. Records without a numeric y value are
/// skipped.
pub struct ChartWidget;

impl ChartWidget {
    fn view(options: &ChartOptions, ctx: &WidgetContext<'_>) -> WidgetView {
        let points = records(ctx.data)
            .iter()
            .filter_map(|row| {
                let value = row.get(&options.y_key)?.as_f64()?;
                Some(ChartPoint {
                    label: field_text(row, &options.x_key),
                    value,
                })
            })
            .collect();
        WidgetView::Chart {
            chart_type: options.chart_type,
            points,
        }
    }
}

impl Widget for ChartWidget {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Chart
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        match ctx.options {
            ComponentOptions::Chart(options) => Self::view(options, ctx),
            _ => mismatched(ctx),
        }
    }
}

fn dated_entries(data: Option<&Value>, at_field: &str, label_field: &str) -> Vec<DatedEntry> {
    let mut entries: Vec<DatedEntry> = records(data)
        .iter()
        .filter(|row| row.get(at_field).is_some())
        .map(|row| DatedEntry {
            at: field_text(row, at_field),
            label: field_text(row, label_field),
        })
        .collect();
    entries.sort_by(|a, b| a.at.cmp(&b.at));
    entries
}

/// Dated entries in date order.
pub struct CalendarWidget;

impl Widget for CalendarWidget {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Calendar
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        match ctx.options {
            ComponentOptions::Calendar(CalendarOptions {
                date_field,
                title_field,
                ..
            }) => WidgetView::Calendar {
                entries: dated_entries(ctx.data, date_field, title_field),
            },
            _ => mismatched(ctx),
        }
    }
}

/// Events in chronological order.
pub struct TimelineWidget;

impl Widget for TimelineWidget {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Timeline
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        match ctx.options {
            ComponentOptions::Timeline(TimelineOptions {
                time_field,
                label_field,
                ..
            }) => WidgetView::Timeline {
                events: dated_entries(ctx.data, time_field, label_field),
            },
            _ => mismatched(ctx),
        }
    }
}

/// Cards grouped into lanes by a status field.
///
/// Without configured columns, lanes follow the statuses in order of first
/// appearance. Cards whose status matches no configured column are dropped.
pub struct KanbanWidget;

impl KanbanWidget {
    fn view(options: &KanbanOptions, ctx: &WidgetContext<'_>) -> WidgetView {
        let rows = records(ctx.data);

        let mut lanes: Vec<KanbanLane> = if options.columns.is_empty() {
            let mut seen: Vec<String> = Vec::new();
            for row in rows {
                let status = field_text(row, &options.status_field);
                if !seen.contains(&status) {
                    seen.push(status);
                }
            }
            seen.into_iter()
                .map(|id| KanbanLane {
                    title: id.clone(),
                    id,
                    cards: Vec::new(),
                })
                .collect()
        } else {
            options
                .columns
                .iter()
                .map(|c| KanbanLane {
                    id: c.id.clone(),
                    title: c.title.clone().unwrap_or_else(|| c.id.clone()),
                    cards: Vec::new(),
                })
                .collect()
        };

        for row in rows {
            let status = field_text(row, &options.status_field);
            if let Some(lane) = lanes.iter_mut().find(|l| l.id == status) {
                lane.cards.push(field_text(row, &options.title_field));
            }
        }

        WidgetView::Kanban { lanes }
    }
}

impl Widget for KanbanWidget {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Kanban
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        match ctx.options {
            ComponentOptions::Kanban(options) => Self::view(options, ctx),
            _ => mismatched(ctx),
        }
    }
}

/// Headline numbers read from an object binding.
pub struct StatsWidget;

impl StatsWidget {
    fn view(options: &StatsOptions, ctx: &WidgetContext<'_>) -> WidgetView {
        let stats = options
            .stats
            .iter()
            .map(|spec| StatView {
                label: spec.label.clone(),
                value: ctx
                    .data
                    .and_then(|d| d.get(&spec.key))
                    .map(|v| format_stat(v, spec.format))
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        WidgetView::Stats { stats }
    }
}

impl Widget for StatsWidget {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Stats
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        match ctx.options {
            ComponentOptions::Stats(options) => Self::view(options, ctx),
            _ => mismatched(ctx),
        }
    }
}

/// Format a stat value. Non-numeric values are shown as-is.
pub fn format_stat(value: &Value, format: StatFormat) -> String {
    let Some(n) = value.as_f64() else {
        return display_value(value);
    };
    match format {
        StatFormat::Number | StatFormat::Text => display_value(value),
        StatFormat::Percent => format!("{}%", trim_float(n)),
        StatFormat::Currency => format!("{:.2}", n),
        StatFormat::Duration => {
            let secs = n.max(0.0).round() as u64;
            match secs {
                s if s < 60 => format!("{}s", s),
                s if s < 3600 => format!("{}m {}s", s / 60, s % 60),
                s => format!("{}h {}m", s / 3600, (s % 3600) / 60),
            }
        }
    }
}

fn trim_float(n: f64) -> String {
    let s = format!("{:.1}", n);
    s.strip_suffix(".0").map(str::to_string).unwrap_or(s)
}

/// File picker; the current selection lives in local input under `files`.
pub struct FileUploadWidget;

impl Widget for FileUploadWidget {
    fn kind(&self) -> ComponentKind {
        ComponentKind::FileUpload
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        let ComponentOptions::FileUpload(FileUploadOptions {
            description,
            accept,
            max_size,
            multiple,
            ..
        }) = ctx.options
        else {
            return mismatched(ctx);
        };

        let selected = match ctx.local_input.get("files") {
            Some(Value::Array(files)) => files.iter().map(display_value).collect(),
            Some(Value::String(file)) => vec![file.clone()],
            _ => Vec::new(),
        };

        WidgetView::FileUpload {
            description: description.clone(),
            accept: accept.clone(),
            max_size: *max_size,
            multiple: *multiple,
            selected,
        }
    }
}

/// Step list; the current step index lives in local input under `step`.
pub struct WizardWidget;

impl Widget for WizardWidget {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Wizard
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        let ComponentOptions::Wizard(WizardOptions { steps, .. }) = ctx.options else {
            return mismatched(ctx);
        };

        let last = steps.len().saturating_sub(1);
        let current = ctx
            .local_input
            .get("step")
            .and_then(Value::as_u64)
            .map(|s| (s as usize).min(last))
            .unwrap_or(0);

        WidgetView::Wizard {
            steps: steps
                .iter()
                .map(|s| WizardStepView {
                    id: s.id.clone(),
                    title: s.title.clone(),
                    description: s.description.clone(),
                })
                .collect(),
            current,
        }
    }
}

/// Summary panel listing the top-level entries of an object binding.
pub struct DashboardWidget;

impl Widget for DashboardWidget {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Dashboard
    }

    fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
        let ComponentOptions::Dashboard(DashboardOptions { description, .. }) = ctx.options else {
            return mismatched(ctx);
        };

        let entries = match ctx.data {
            Some(Value::Object(obj)) => obj
                .iter()
                .map(|(k, v)| (k.clone(), display_value(v)))
                .collect(),
            _ => Vec::new(),
        };

        WidgetView::Dashboard {
            description: description.clone(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn component(id: &str, kind: ComponentKind, config: Value) -> (Component, ComponentOptions) {
        let mut component = Component::new(id, kind);
        component.config = config.as_object().cloned().unwrap_or_default();
        let options = ComponentOptions::parse(id, &component.kind, &component.config).unwrap();
        (component, options)
    }

    fn render(
        component: &Component,
        options: &ComponentOptions,
        data: Option<&Value>,
        local: &Map<String, Value>,
    ) -> Option<WidgetView> {
        let state = State::new();
        let ctx = WidgetContext {
            component,
            options,
            data,
            state: &state,
            local_input: local,
        };
        WidgetRegistry::builtin().render(&ctx)
    }

    #[test]
    fn test_builtin_covers_every_kind() {
        let registry = WidgetRegistry::builtin();
        assert_eq!(registry.len(), ComponentKind::ALL.len());
        for kind in ComponentKind::ALL.iter() {
            assert!(registry.contains(kind), "missing widget for {}", kind);
        }
    }

    #[test]
    fn test_unregistered_type_renders_nothing() {
        let (c, o) = component("upload", ComponentKind::FileUpload, json!({}));
        let state = State::new();
        let local = Map::new();
        let ctx = WidgetContext {
            component: &c,
            options: &o,
            data: None,
            state: &state,
            local_input: &local,
        };
        assert!(WidgetRegistry::empty().render(&ctx).is_none());

        let mut registry = WidgetRegistry::builtin();
        registry.unregister(&ComponentKind::FileUpload);
        assert!(registry.render(&ctx).is_none());
    }

    #[test]
    fn test_custom_widget_for_unknown_type() {
        struct MapWidget;
        impl Widget for MapWidget {
            fn kind(&self) -> ComponentKind {
                ComponentKind::Unknown("map".to_string())
            }
            fn render(&self, ctx: &WidgetContext<'_>) -> WidgetView {
                WidgetView::Raw {
                    data: ctx.data.cloned().unwrap_or_default(),
                }
            }
        }

        let (c, o) = component("m", ComponentKind::Unknown("map".to_string()), json!({}));
        let state = State::new();
        let local = Map::new();
        let data = json!({ "lat": 1 });
        let ctx = WidgetContext {
            component: &c,
            options: &o,
            data: Some(&data),
            state: &state,
            local_input: &local,
        };

        let mut registry = WidgetRegistry::builtin();
        assert!(registry.render(&ctx).is_none());
        registry.register(MapWidget);
        assert_eq!(registry.render(&ctx), Some(WidgetView::Raw { data }));
    }

    #[test]
    fn test_form_field_visibility_uses_local_input() {
        let (c, o) = component(
            "file-input",
            ComponentKind::Form,
            json!({
                "fields": [
                    { "id": "source_type", "type": "select", "label": "Source",
                      "options": [{ "value": "upload", "label": "Upload" }] },
                    { "id": "file_upload", "type": "fileUpload", "label": "PDF",
                      "visibility": { "conditions": [{ "field": "source_type", "operator": "eq", "value": "upload" }] } },
                    { "id": "cloud_path", "type": "text",
                      "visibility": { "conditions": [{ "field": "source_type", "operator": "neq", "value": "upload" }] } }
                ]
            }),
        );

        let mut local = Map::new();
        local.insert("source_type".to_string(), json!("upload"));
        let Some(WidgetView::Form { fields, .. }) = render(&c, &o, None, &local) else {
            panic!("expected form view");
        };
        let ids: Vec<&str> = fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["source_type", "file_upload"]);
        assert_eq!(fields[0].value, Some(json!("upload")));

        let Some(WidgetView::Form { fields, .. }) = render(&c, &o, None, &Map::new()) else {
            panic!("expected form view");
        };
        let ids: Vec<&str> = fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["source_type", "cloud_path"]);
        assert_eq!(fields[1].label, "cloud_path");
    }

    #[test]
    fn test_data_grid_filters_and_actions() {
        let (c, o) = component(
            "recent",
            ComponentKind::DataGrid,
            json!({
                "columns": [
                    { "field": "filename", "header": "File Name" },
                    { "field": "status", "type": "status" },
                    { "field": "actions", "header": "Actions", "type": "actions" }
                ],
                "actions": [
                    { "label": "View Output", "handler": "viewOutput" },
                    { "label": "Retry", "handler": "retryProcess", "style": "destructive" }
                ],
                "filters": [{ "field": "filename", "type": "text", "label": "Search" }]
            }),
        );
        let data = json!([
            { "filename": "Invoice.pdf", "status": "active" },
            { "filename": "report.pdf", "status": "error" },
            { "filename": "invoice-2.pdf", "status": "active" }
        ]);
        let mut local = Map::new();
        local.insert("filename".to_string(), json!("INVOICE"));

        let Some(WidgetView::Table {
            headers,
            rows,
            total_rows,
            row_actions,
            ..
        }) = render(&c, &o, Some(&data), &local)
        else {
            panic!("expected table view");
        };

        assert_eq!(headers, vec!["File Name", "status", "Actions"]);
        assert_eq!(total_rows, 2);
        assert_eq!(rows[0], vec!["Invoice.pdf", "active", "View Output | Retry"]);
        assert_eq!(row_actions[0].style, ActionStyle::Secondary);
        assert_eq!(row_actions[1].style, ActionStyle::Destructive);
    }

    #[test]
    fn test_table_page_size_limits_rows() {
        let (c, o) = component(
            "t",
            ComponentKind::Table,
            json!({ "columns": [{ "field": "n" }], "pageSize": 2 }),
        );
        let data = json!({ "items": [{ "n": 1 }, { "n": 2 }, { "n": 3 }] });
        let Some(WidgetView::Table { rows, total_rows, .. }) = render(&c, &o, Some(&data), &Map::new())
        else {
            panic!("expected table view");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(total_rows, 3);
    }

    #[test]
    fn test_stats_formats_and_missing_values() {
        let (c, o) = component(
            "processing-stats",
            ComponentKind::Stats,
            json!({
                "stats": [
                    { "label": "PDFs Processed", "key": "processed_count" },
                    { "label": "Success Rate", "key": "success_rate", "format": "percent" },
                    { "label": "Average Time", "key": "avg_processing_time", "format": "duration" },
                    { "label": "Backlog", "key": "backlog" }
                ]
            }),
        );
        let data = json!({ "processed_count": 42, "success_rate": 97.5, "avg_processing_time": 125 });
        let Some(WidgetView::Stats { stats }) = render(&c, &o, Some(&data), &Map::new()) else {
            panic!("expected stats view");
        };
        let values: Vec<&str> = stats.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["42", "97.5%", "2m 5s", "-"]);
    }

    #[test]
    fn test_kanban_groups_by_status() {
        let (c, o) = component(
            "board",
            ComponentKind::Kanban,
            json!({ "columns": [{ "id": "todo", "title": "To do" }, { "id": "done" }] }),
        );
        let data = json!([
            { "title": "a", "status": "todo" },
            { "title": "b", "status": "done" },
            { "title": "c", "status": "todo" },
            { "title": "d", "status": "archived" }
        ]);
        let Some(WidgetView::Kanban { lanes }) = render(&c, &o, Some(&data), &Map::new()) else {
            panic!("expected kanban view");
        };
        assert_eq!(lanes[0].title, "To do");
        assert_eq!(lanes[0].cards, vec!["a", "c"]);
        assert_eq!(lanes[1].title, "done");
        assert_eq!(lanes[1].cards, vec!["b"]);
    }

    #[test]
    fn test_chart_skips_non_numeric_points() {
        let (c, o) = component("c", ComponentKind::Chart, json!({ "chartType": "line" }));
        let data = json!([{ "label": "mon", "value": 3 }, { "label": "tue", "value": "n/a" }]);
        let Some(WidgetView::Chart { chart_type, points }) = render(&c, &o, Some(&data), &Map::new())
        else {
            panic!("expected chart view");
        };
        assert_eq!(chart_type, ChartKind::Line);
        assert_eq!(points, vec![ChartPoint { label: "mon".to_string(), value: 3.0 }]);
    }

    #[test]
    fn test_wizard_clamps_step() {
        let (c, o) = component(
            "w",
            ComponentKind::Wizard,
            json!({ "steps": [{ "id": "a", "title": "A" }, { "id": "b", "title": "B" }] }),
        );
        let mut local = Map::new();
        local.insert("step".to_string(), json!(9));
        let Some(WidgetView::Wizard { current, .. }) = render(&c, &o, None, &local) else {
            panic!("expected wizard view");
        };
        assert_eq!(current, 1);
    }
}
