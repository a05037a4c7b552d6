//! Main layout rendering.

use crate::app::{App, Focus};
use crate::ui::logs::render_logs_panel;
use crate::ui::theme::Palette;
use crate::ui::widgets::render_component;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};
use tessera_render::LayoutView;

/// Dashboard grid width in columns.
const GRID_COLUMNS: u32 = 12;

/// Render the entire application UI.
pub fn render(app: &App, frame: &mut Frame) {
    let palette = Palette::from_theme(app.tree.theme.as_ref());
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(3),    // Layout body
        Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

    render_header(app, palette, frame, chunks[0]);

    let body = if app.show_logs {
        let split = Layout::horizontal([Constraint::Min(30), Constraint::Percentage(35)]).split(chunks[1]);
        render_logs_panel(&app.log_buffer, app.log_scroll, frame, split[1]);
        split[0]
    } else {
        chunks[1]
    };
    render_body(app, palette, frame, body);

    render_status_bar(app, frame, chunks[2]);
}

fn render_header(app: &App, palette: Palette, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" tessera ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("{} ", app.tree.config_id),
            Style::default().fg(palette.primary),
        ),
    ];
    if !app.tree.version.is_empty() {
        spans.push(Span::styled(
            format!("v{} ", app.tree.version),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(principal) = app.session.principal() {
        spans.push(Span::styled(
            format!("user:{} ", principal.user_id),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if app.in_flight > 0 {
        spans.push(Span::styled(
            format!("◐ {} running", app.in_flight),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_body(app: &App, palette: Palette, frame: &mut Frame, area: Rect) {
    let focused_id = app.focused().map(|c| c.id.as_str());
    let is_focused = |id: &str| app.focus == Focus::Components && focused_id == Some(id);

    match &app.tree.root {
        LayoutView::Single { content } => match content {
            Some(component) => render_component(app, component, is_focused(&component.id), palette, frame, area),
            None => render_empty(frame, area),
        },
        LayoutView::Split { left, right } => {
            let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
            for (slot, half) in [left, right].into_iter().zip(halves.iter()) {
                if let Some(component) = slot {
                    render_component(app, component, is_focused(&component.id), palette, frame, *half);
                }
            }
        }
        LayoutView::Tabs { tabs, .. } => {
            if tabs.is_empty() {
                render_empty(frame, area);
                return;
            }
            let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(area);
            let active = app.selected.min(tabs.len() - 1);
            let bar = Tabs::new(tabs.iter().map(|t| t.label.clone()))
                .select(active)
                .style(Style::default().fg(Color::DarkGray))
                .highlight_style(
                    Style::default()
                        .fg(palette.primary)
                        .add_modifier(Modifier::BOLD),
                );
            frame.render_widget(bar, chunks[0]);

            let content = &tabs[active].content;
            render_component(app, content, is_focused(&content.id), palette, frame, chunks[1]);
        }
        LayoutView::Dashboard { cells, rows } => {
            if cells.is_empty() {
                render_empty(frame, area);
                return;
            }
            for cell in cells {
                let rect = grid_rect(area, cell.column, cell.row, cell.width, cell.height, *rows);
                if rect.width > 0 && rect.height > 0 {
                    render_component(app, &cell.content, is_focused(&cell.content.id), palette, frame, rect);
                }
            }
        }
    }
}

/// Map a 12-column grid placement onto `area`, splitting the height evenly
/// across `rows` grid rows.
pub fn grid_rect(area: Rect, column: u16, row: u16, width: u16, height: u16, rows: u16) -> Rect {
    let rows = u32::from(rows.max(1));
    let (w, h) = (u32::from(area.width), u32::from(area.height));
    let x0 = w * u32::from(column) / GRID_COLUMNS;
    let x1 = (w * (u32::from(column) + u32::from(width)) / GRID_COLUMNS).min(w);
    let y0 = (h * u32::from(row) / rows).min(h);
    let y1 = (h * (u32::from(row) + u32::from(height)) / rows).min(h);

    Rect {
        x: area.x.saturating_add(x0.min(w) as u16),
        y: area.y.saturating_add(y0 as u16),
        width: x1.saturating_sub(x0) as u16,
        height: y1.saturating_sub(y0) as u16,
    }
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let empty = Paragraph::new(Line::from(Span::styled(
        "  Nothing to display",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(empty, area);
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let text = if let Some(ref editing) = app.editing {
        format!("editing {}: {}▏ │ Enter save │ Esc cancel", editing.component, editing.buffer)
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if app.focus == Focus::Logs {
        "↑↓ scroll │ Esc close".to_string()
    } else {
        "Tab next │ ↑↓ select │ ←→ change │ Enter edit │ 1-9 action │ r refresh │ ^L logs │ q quit".to_string()
    };
    let status = Paragraph::new(Line::from(Span::styled(
        format!(" {}", text),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(status, area);
}
