//! Logs panel rendering.

use crate::logs::LogBuffer;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Render the logs panel.
pub fn render_logs_panel(log_buffer: &LogBuffer, scroll: usize, frame: &mut Frame, area: Rect) {
    let entries = log_buffer.entries();

    let block = Block::default()
        .title(format!(" logs ({}) ", entries.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if entries.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No log entries yet...",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(empty, inner);
        return;
    }

    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            let target = entry.target.rsplit("::").next().unwrap_or(&entry.target);
            Line::from(vec![
                Span::styled(
                    format!("[{}]", entry.level_prefix()),
                    Style::default()
                        .fg(entry.level_color())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {}: ", target), Style::default().fg(Color::DarkGray)),
                Span::raw(entry.display_message()),
            ])
        })
        .collect();

    let visible_height = inner.height as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    let visible: Vec<Line> = lines
        .into_iter()
        .skip(scroll.min(max_scroll))
        .take(visible_height)
        .collect();

    frame.render_widget(Paragraph::new(visible).wrap(Wrap { trim: false }), inner);
}
