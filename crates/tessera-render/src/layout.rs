//! Layout composition.
//!
//! Arranges the visible components of a config into the container its
//! [`LayoutKind`] names. Slot selection happens before widget dispatch, so a
//! `single` layout never renders its second component even when the first
//! has no widget.

use serde::Serialize;
use tessera_types::{Action, Component, ComponentKind, GRID_COLUMNS, LayoutKind, Theme};

use crate::widget::WidgetView;

/// The fully rendered UI for one state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderTree {
    pub config_id: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    pub root: LayoutView,
}

impl RenderTree {
    /// Rendered components in display order.
    pub fn components(&self) -> Vec<&RenderedComponent> {
        match &self.root {
            LayoutView::Single { content } => content.iter().collect(),
            LayoutView::Split { left, right } => left.iter().chain(right.iter()).collect(),
            LayoutView::Tabs { tabs, .. } => tabs.iter().map(|t| &t.content).collect(),
            LayoutView::Dashboard { cells, .. } => cells.iter().map(|c| &c.content).collect(),
        }
    }

    /// Look up a rendered component by id.
    pub fn component(&self, id: &str) -> Option<&RenderedComponent> {
        self.components().into_iter().find(|c| c.id == id)
    }
}

/// One component after widget dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedComponent {
    pub id: String,
    pub kind: ComponentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub view: WidgetView,
    /// Declared and embedded actions, in that order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

/// Container arrangement of rendered components.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayoutView {
    Single {
        content: Option<RenderedComponent>,
    },
    /// Two equal-width regions; a missing region renders empty.
    Split {
        left: Option<RenderedComponent>,
        right: Option<RenderedComponent>,
    },
    Tabs {
        tabs: Vec<Tab>,
        /// Key of the active tab.
        active: Option<String>,
    },
    Dashboard {
        cells: Vec<GridCell>,
        /// Total grid rows occupied.
        rows: u16,
    },
}

impl LayoutView {
    pub fn kind(&self) -> LayoutKind {
        match self {
            LayoutView::Single { .. } => LayoutKind::Single,
            LayoutView::Split { .. } => LayoutKind::Split,
            LayoutView::Tabs { .. } => LayoutKind::Tabs,
            LayoutView::Dashboard { .. } => LayoutKind::Dashboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
    /// The component id.
    pub key: String,
    pub label: String,
    pub content: RenderedComponent,
}

/// A component placed on the 12-column dashboard grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub column: u16,
    pub row: u16,
    pub width: u16,
    pub height: u16,
    pub content: RenderedComponent,
}

/// Arrange visible components. `render` dispatches one component to its
/// widget and returns `None` when it renders nothing.
pub fn compose<'a, F>(kind: LayoutKind, visible: &[&'a Component], mut render: F) -> LayoutView
where
    F: FnMut(&'a Component) -> Option<RenderedComponent>,
{
    match kind {
        LayoutKind::Single => LayoutView::Single {
            content: visible.first().and_then(|c| render(*c)),
        },
        LayoutKind::Split => {
            if visible.len() > 2 {
                let dropped: Vec<&str> = visible[2..].iter().map(|c| c.id.as_str()).collect();
                tracing::warn!(?dropped, "Split layout shows two components, dropping the rest");
            }
            LayoutView::Split {
                left: visible.first().and_then(|c| render(*c)),
                right: visible.get(1).and_then(|c| render(*c)),
            }
        }
        LayoutKind::Tabs => {
            let tabs: Vec<Tab> = visible
                .iter()
                .filter_map(|c| render(*c))
                .map(|content| Tab {
                    key: content.id.clone(),
                    label: content.title.clone().unwrap_or_else(|| content.id.clone()),
                    content,
                })
                .collect();
            LayoutView::Tabs {
                active: tabs.first().map(|t| t.key.clone()),
                tabs,
            }
        }
        LayoutKind::Dashboard => {
            let mut grid = FlowGrid::default();
            let cells = visible
                .iter()
                .filter_map(|c| {
                    let content = render(*c)?;
                    let (width, height) = span(c);
                    let (column, row) = grid.place(width, height);
                    Some(GridCell {
                        column,
                        row,
                        width,
                        height,
                        content,
                    })
                })
                .collect();
            LayoutView::Dashboard {
                cells,
                rows: grid.rows(),
            }
        }
    }
}

/// Tallest cell a dashboard places, in grid rows.
pub const MAX_CELL_HEIGHT: u16 = 24;

/// Grid span of a component: full row and one row high by default.
fn span(component: &Component) -> (u16, u16) {
    let position = component.position.unwrap_or_default();
    let width = position.width.unwrap_or(GRID_COLUMNS).clamp(1, GRID_COLUMNS);
    let height = position.height.unwrap_or(1).clamp(1, MAX_CELL_HEIGHT);
    (width, height)
}

/// Left-to-right, top-to-bottom placement with wrapping. No collision
/// detection: a row is as tall as its tallest cell.
#[derive(Debug, Default)]
struct FlowGrid {
    column: u16,
    row: u16,
    row_height: u16,
}

impl FlowGrid {
    fn place(&mut self, width: u16, height: u16) -> (u16, u16) {
        if self.column.saturating_add(width) > GRID_COLUMNS {
            self.row = self.row.saturating_add(self.row_height);
            self.column = 0;
            self.row_height = 0;
        }
        let at = (self.column, self.row);
        self.column = self.column.saturating_add(width);
        self.row_height = self.row_height.max(height);
        at
    }

    fn rows(&self) -> u16 {
        self.row.saturating_add(self.row_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::Position;

    fn component(id: &str, width: Option<u16>, height: Option<u16>) -> Component {
        let mut c = Component::new(id, ComponentKind::Stats);
        c.position = Some(Position {
            x: 0,
            y: 0,
            width,
            height,
        });
        c
    }

    fn rendered(c: &Component) -> Option<RenderedComponent> {
        Some(RenderedComponent {
            id: c.id.clone(),
            kind: c.kind.clone(),
            title: c.title().map(str::to_string),
            view: WidgetView::Stats { stats: Vec::new() },
            actions: Vec::new(),
        })
    }

    fn ids(view: &LayoutView) -> Vec<String> {
        let tree = RenderTree {
            config_id: "t".to_string(),
            version: String::new(),
            theme: None,
            root: view.clone(),
        };
        tree.components().iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_single_renders_only_first() {
        let a = component("A", None, None);
        let b = component("B", None, None);
        let mut rendered_ids = Vec::new();
        let view = compose(LayoutKind::Single, &[&a, &b], |c| {
            rendered_ids.push(c.id.clone());
            rendered(c)
        });
        assert_eq!(ids(&view), vec!["A"]);
        assert_eq!(rendered_ids, vec!["A"]);
    }

    #[test]
    fn test_single_with_unrenderable_first_is_empty() {
        let a = component("A", None, None);
        let b = component("B", None, None);
        let view = compose(LayoutKind::Single, &[&a, &b], |c| if c.id == "A" { None } else { rendered(c) });
        assert_eq!(view, LayoutView::Single { content: None });
    }

    #[test]
    fn test_split_regions() {
        let a = component("A", None, None);
        let b = component("B", None, None);
        let c = component("C", None, None);

        let view = compose(LayoutKind::Split, &[&a, &b, &c], rendered);
        assert_eq!(ids(&view), vec!["A", "B"]);

        let view = compose(LayoutKind::Split, &[&a], rendered);
        let LayoutView::Split { left, right } = view else {
            panic!("expected split");
        };
        assert_eq!(left.map(|c| c.id), Some("A".to_string()));
        assert!(right.is_none());
    }

    #[test]
    fn test_tabs_first_active() {
        let a = component("A", None, None);
        let b = component("B", None, None);
        let view = compose(LayoutKind::Tabs, &[&a, &b], rendered);
        let LayoutView::Tabs { tabs, active } = view else {
            panic!("expected tabs");
        };
        assert_eq!(active.as_deref(), Some("A"));
        assert_eq!(tabs[1].key, "B");
        assert_eq!(tabs[1].label, "B");

        let empty = compose(LayoutKind::Tabs, &[], rendered);
        assert_eq!(empty, LayoutView::Tabs { tabs: Vec::new(), active: None });
    }

    #[test]
    fn test_dashboard_flow_placement() {
        let stats = component("stats", Some(12), Some(1));
        let form = component("form", Some(4), Some(2));
        let grid = component("grid", Some(8), Some(2));
        let wide = component("wide", Some(40), Some(0));
        let default = Component::new("default", ComponentKind::Chart);

        let view = compose(LayoutKind::Dashboard, &[&stats, &form, &grid, &wide, &default], rendered);
        let LayoutView::Dashboard { cells, rows } = view else {
            panic!("expected dashboard");
        };

        let placed: Vec<(&str, u16, u16, u16, u16)> = cells
            .iter()
            .map(|c| (c.content.id.as_str(), c.column, c.row, c.width, c.height))
            .collect();
        assert_eq!(
            placed,
            vec![
                ("stats", 0, 0, 12, 1),
                ("form", 0, 1, 4, 2),
                ("grid", 4, 1, 8, 2),
                ("wide", 0, 3, 12, 1),
                ("default", 0, 4, 12, 1),
            ]
        );
        assert_eq!(rows, 5);
    }

    #[test]
    fn test_dashboard_tall_cells_are_clamped() {
        let a = component("a", Some(12), Some(40000));
        let b = component("b", Some(12), Some(40000));

        let view = compose(LayoutKind::Dashboard, &[&a, &b], rendered);
        let LayoutView::Dashboard { cells, rows } = view else {
            panic!("expected dashboard");
        };

        assert_eq!(cells[0].row, 0);
        assert_eq!(cells[0].height, MAX_CELL_HEIGHT);
        assert_eq!(cells[1].row, MAX_CELL_HEIGHT);
        assert_eq!(rows, MAX_CELL_HEIGHT * 2);
    }

    #[test]
    fn test_dashboard_ignores_declared_coordinates() {
        let mut late = component("late", Some(6), Some(1));
        late.position = late.position.map(|p| Position { x: 6, y: 9, ..p });
        let early = component("early", Some(6), Some(1));

        let view = compose(LayoutKind::Dashboard, &[&late, &early], rendered);
        let LayoutView::Dashboard { cells, rows } = view else {
            panic!("expected dashboard");
        };

        let placed: Vec<(&str, u16, u16)> = cells.iter().map(|c| (c.content.id.as_str(), c.column, c.row)).collect();
        assert_eq!(placed, vec![("late", 0, 0), ("early", 6, 0)]);
        assert_eq!(rows, 1);
    }
}
