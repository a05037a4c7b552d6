//! Drawing for rendered components.
//!
//! Each [`WidgetView`] variant maps to a ratatui widget inside a bordered
//! block titled with the component's title.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Row, Table, TableState, Wrap},
};
use serde_json::Value;
use tessera_render::{ChartPoint, FieldView, RenderedComponent, WidgetView, display_value};
use tessera_types::{ActionStyle, ChartKind, FieldKind};

use crate::app::{App, EditTarget};
use crate::ui::theme::Palette;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Draw one component, its body and its action hints.
pub fn render_component(
    app: &App,
    component: &RenderedComponent,
    focused: bool,
    palette: Palette,
    frame: &mut Frame,
    area: Rect,
) {
    let title = component.title.clone().unwrap_or_else(|| component.id.clone());
    let border = if focused { palette.primary } else { palette.secondary };
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (body, footer) = if component.actions.is_empty() {
        (inner, None)
    } else {
        let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        (chunks[0], Some(chunks[1]))
    };

    let cursor = app.cursor(&component.id);
    match &component.view {
        WidgetView::Form { description, fields } => {
            render_form(app, component, description.as_deref(), fields, focused.then_some(cursor), palette, frame, body)
        }
        WidgetView::Table {
            headers,
            rows,
            total_rows,
            row_actions,
            filters,
            ..
        } => {
            let mut lines = Vec::new();
            let active: Vec<String> = filters
                .iter()
                .filter(|f| !f.value.is_empty())
                .map(|f| format!("{}~{}", f.label, f.value))
                .collect();
            if !active.is_empty() {
                lines.push(format!("filter: {}", active.join(", ")));
            }
            lines.push(format!("{} of {} rows", rows.len(), total_rows));
            if !row_actions.is_empty() {
                let labels: Vec<String> = row_actions
                    .iter()
                    .enumerate()
                    .map(|(i, a)| {
                        if focused && i == app.row_action {
                            format!("‹{}›", a.label)
                        } else {
                            a.label.clone()
                        }
                    })
                    .collect();
                lines.push(format!("row: {}", labels.join(" ")));
            }
            render_table(headers, rows, focused.then_some(cursor), lines, palette, frame, body)
        }
        WidgetView::Chart { chart_type, points } => render_chart(*chart_type, points, palette, frame, body),
        WidgetView::Calendar { entries } | WidgetView::Timeline { events: entries } => {
            let lines: Vec<Line> = entries
                .iter()
                .map(|e| {
                    Line::from(vec![
                        Span::styled(format!("{} ", e.at), Style::default().fg(palette.secondary)),
                        Span::raw(e.label.clone()),
                    ])
                })
                .collect();
            render_lines(lines, frame, body);
        }
        WidgetView::Kanban { lanes } => {
            if lanes.is_empty() {
                render_lines(vec![], frame, body);
            } else {
                let constraints = vec![Constraint::Ratio(1, lanes.len() as u32); lanes.len()];
                let columns = Layout::horizontal(constraints).split(body);
                for (lane, column) in lanes.iter().zip(columns.iter()) {
                    let mut lines = vec![Line::from(Span::styled(
                        format!("{} ({})", lane.title, lane.cards.len()),
                        Style::default().fg(palette.primary).add_modifier(Modifier::BOLD),
                    ))];
                    lines.extend(lane.cards.iter().map(|c| Line::from(format!("• {}", c))));
                    render_lines(lines, frame, *column);
                }
            }
        }
        WidgetView::Stats { stats } => {
            if stats.is_empty() {
                render_lines(vec![], frame, body);
            } else {
                let constraints = vec![Constraint::Ratio(1, stats.len() as u32); stats.len()];
                let columns = Layout::horizontal(constraints).split(body);
                for (stat, column) in stats.iter().zip(columns.iter()) {
                    let lines = vec![
                        Line::from(Span::styled(stat.label.clone(), Style::default().fg(palette.secondary))),
                        Line::from(Span::styled(
                            stat.value.clone(),
                            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                        )),
                    ];
                    render_lines(lines, frame, *column);
                }
            }
        }
        WidgetView::FileUpload {
            description,
            accept,
            max_size,
            multiple,
            selected,
        } => {
            let mut lines = Vec::new();
            if let Some(description) = description {
                lines.push(Line::from(description.clone()));
            }
            let mut limits = Vec::new();
            if let Some(accept) = accept {
                limits.push(format!("accepts {}", accept));
            }
            if let Some(max) = max_size {
                limits.push(format!("max {} bytes", max));
            }
            if *multiple {
                limits.push("multiple".to_string());
            }
            if !limits.is_empty() {
                lines.push(Line::from(Span::styled(limits.join(" · "), Style::default().fg(palette.secondary))));
            }
            if selected.is_empty() {
                lines.push(Line::from("No files selected (Enter to add)"));
            } else {
                lines.extend(selected.iter().map(|f| Line::from(format!("📄 {}", f))));
            }
            if let Some(editing) = app.editing.as_ref()
                && editing.component == component.id
                && editing.target == EditTarget::UploadFile
            {
                lines.push(Line::from(format!("+ {}▏", editing.buffer)));
            }
            render_lines(lines, frame, body);
        }
        WidgetView::Wizard { steps, current } => {
            let lines: Vec<Line> = steps
                .iter()
                .enumerate()
                .map(|(i, step)| {
                    let (marker, style) = match i.cmp(current) {
                        std::cmp::Ordering::Less => ("✓", Style::default().fg(palette.accent)),
                        std::cmp::Ordering::Equal => (
                            "▶",
                            Style::default().fg(palette.primary).add_modifier(Modifier::BOLD),
                        ),
                        std::cmp::Ordering::Greater => ("·", Style::default().fg(palette.secondary)),
                    };
                    let mut text = format!("{} {}", marker, step.title);
                    if i == *current
                        && let Some(description) = &step.description
                    {
                        text.push_str(&format!(": {}", description));
                    }
                    Line::from(Span::styled(text, style))
                })
                .collect();
            render_lines(lines, frame, body);
        }
        WidgetView::Dashboard { description, entries } => {
            let mut lines = Vec::new();
            if let Some(description) = description {
                lines.push(Line::from(description.clone()));
            }
            lines.extend(entries.iter().map(|(key, value)| {
                Line::from(vec![
                    Span::styled(format!("{}: ", key), Style::default().fg(palette.secondary)),
                    Span::raw(value.clone()),
                ])
            }));
            render_lines(lines, frame, body);
        }
        WidgetView::Raw { data } => {
            let text = serde_json::to_string_pretty(data).unwrap_or_default();
            render_lines(text.lines().map(|l| Line::from(l.to_string())).collect(), frame, body);
        }
    }

    if let Some(footer) = footer {
        render_action_hints(component, palette, frame, footer);
    }
}

fn render_lines(lines: Vec<Line<'_>>, frame: &mut Frame, area: Rect) {
    let lines = if lines.is_empty() {
        vec![Line::from(Span::styled("No data", Style::default().fg(Color::DarkGray)))]
    } else {
        lines
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

#[allow(clippy::too_many_arguments)]
fn render_form(
    app: &App,
    component: &RenderedComponent,
    description: Option<&str>,
    fields: &[FieldView],
    cursor: Option<usize>,
    palette: Palette,
    frame: &mut Frame,
    area: Rect,
) {
    let mut lines = Vec::new();
    if let Some(description) = description {
        lines.push(Line::from(Span::styled(description.to_string(), Style::default().fg(palette.secondary))));
    }

    for (i, field) in fields.iter().enumerate() {
        let selected = cursor == Some(i);
        let editing = app.editing.as_ref().filter(|e| {
            e.component == component.id && matches!(&e.target, EditTarget::Field { id, .. } if *id == field.id)
        });

        let value = match editing {
            Some(e) => format!("{}▏", e.buffer),
            None => field_display(field),
        };
        let label_style = if selected {
            Style::default().fg(palette.primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(if selected { "› " } else { "  " }),
            Span::styled(
                format!("{}{}: ", field.label, if field.required { "*" } else { "" }),
                label_style,
            ),
            Span::raw(value),
        ]));
    }
    render_lines(lines, frame, area);
}

/// Current value of a field as shown in the form.
fn field_display(field: &FieldView) -> String {
    match (field.kind, field.value.as_ref()) {
        (FieldKind::Checkbox, value) => {
            if value.and_then(Value::as_bool).unwrap_or(false) { "[x]" } else { "[ ]" }.to_string()
        }
        (FieldKind::Select, Some(value)) => {
            let label = field
                .options
                .iter()
                .find(|o| &o.value == value)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| display_value(value));
            format!("‹ {} ›", label)
        }
        (FieldKind::Password, Some(value)) => "•".repeat(display_value(value).chars().count()),
        (_, Some(value)) => display_value(value),
        (_, None) => field.placeholder.clone().unwrap_or_default(),
    }
}

fn render_table(
    headers: &[String],
    rows: &[Vec<String>],
    cursor: Option<usize>,
    info: Vec<String>,
    palette: Palette,
    frame: &mut Frame,
    area: Rect,
) {
    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(info.len() as u16)]).split(area);

    let widths = vec![Constraint::Ratio(1, headers.len().max(1) as u32); headers.len().max(1)];
    let header = Row::new(headers.iter().cloned())
        .style(Style::default().fg(palette.primary).add_modifier(Modifier::BOLD));
    let table = Table::new(rows.iter().map(|r| Row::new(r.iter().cloned())), widths)
        .header(header)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    state.select(cursor.filter(|_| !rows.is_empty()));
    frame.render_stateful_widget(table, chunks[0], &mut state);

    let info: Vec<Line> = info
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(palette.secondary))))
        .collect();
    frame.render_widget(Paragraph::new(info), chunks[1]);
}

fn render_chart(kind: ChartKind, points: &[ChartPoint], palette: Palette, frame: &mut Frame, area: Rect) {
    if points.is_empty() {
        return render_lines(vec![], frame, area);
    }
    match kind {
        ChartKind::Bar => {
            let bars: Vec<Bar> = points
                .iter()
                .map(|p| {
                    Bar::default()
                        .label(Line::from(p.label.clone()))
                        .value(p.value.max(0.0).round() as u64)
                })
                .collect();
            let chart = BarChart::default()
                .data(BarGroup::default().bars(&bars))
                .bar_width(5)
                .bar_gap(1)
                .bar_style(Style::default().fg(palette.primary))
                .value_style(Style::default().fg(Color::Black).bg(palette.primary));
            frame.render_widget(chart, area);
        }
        ChartKind::Line | ChartKind::Area => {
            let lines = vec![
                Line::from(Span::styled(sparkline(points), Style::default().fg(palette.primary))),
                Line::from(Span::styled(
                    format!(
                        "{} … {}",
                        points.first().map(|p| p.label.as_str()).unwrap_or_default(),
                        points.last().map(|p| p.label.as_str()).unwrap_or_default()
                    ),
                    Style::default().fg(palette.secondary),
                )),
            ];
            render_lines(lines, frame, area);
        }
        ChartKind::Pie => {
            let total: f64 = points.iter().map(|p| p.value.max(0.0)).sum();
            let lines = points
                .iter()
                .map(|p| {
                    let share = if total > 0.0 { p.value.max(0.0) / total * 100.0 } else { 0.0 };
                    Line::from(vec![
                        Span::styled(format!("{:>5.1}% ", share), Style::default().fg(palette.accent)),
                        Span::raw(p.label.clone()),
                    ])
                })
                .collect();
            render_lines(lines, frame, area);
        }
    }
}

/// One block character per point, scaled between the series min and max.
pub fn sparkline(points: &[ChartPoint]) -> String {
    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let top = (SPARK_LEVELS.len() - 1) as f64;
    points
        .iter()
        .map(|p| {
            let level = if span > 0.0 { ((p.value - min) / span * top).round() as usize } else { 0 };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

fn render_action_hints(component: &RenderedComponent, palette: Palette, frame: &mut Frame, area: Rect) {
    let spans: Vec<Span> = component
        .actions
        .iter()
        .take(9)
        .enumerate()
        .flat_map(|(i, action)| {
            let color = match action.style.unwrap_or_default() {
                ActionStyle::Primary => palette.primary,
                ActionStyle::Destructive => Color::Red,
                ActionStyle::Secondary | ActionStyle::Ghost => palette.secondary,
            };
            [
                Span::styled(format!("[{}]", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!(" {}  ", action.label), Style::default().fg(color)),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
