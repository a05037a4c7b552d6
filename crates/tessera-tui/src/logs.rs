//! Log capture for the TUI.
//!
//! The terminal is owned by the renderer while the TUI runs, so tracing
//! events are captured into a ring buffer and drawn in the logs panel.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;
use ratatui::style::Color;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Default number of log entries to keep.
const DEFAULT_CAPACITY: usize = 500;

/// Event fields shown next to the message, in display order.
const CONTEXT_FIELDS: &[&str] = &["component", "action", "endpoint", "error"];

/// A single captured log event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    /// Module path the event came from.
    pub target: String,
    pub message: String,
    /// Selected structured fields as `key=value` pairs.
    pub context: Vec<(String, String)>,
}

impl LogEntry {
    pub fn level_color(&self) -> Color {
        match self.level {
            Level::ERROR => Color::Red,
            Level::WARN => Color::Yellow,
            Level::INFO => Color::Green,
            Level::DEBUG => Color::Cyan,
            Level::TRACE => Color::DarkGray,
        }
    }

    pub fn level_prefix(&self) -> &'static str {
        match self.level {
            Level::ERROR => "ERR",
            Level::WARN => "WRN",
            Level::INFO => "INF",
            Level::DEBUG => "DBG",
            Level::TRACE => "TRC",
        }
    }

    /// The message followed by its context fields.
    pub fn display_message(&self) -> String {
        let mut out = self.message.clone();
        for (key, value) in &self.context {
            let _ = write!(out, " {key}={value}");
        }
        out
    }
}

/// Shared log buffer that can be read by the TUI.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a buffer keeping at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn push(&self, entry: LogEntry) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}

/// A tracing layer that captures events into a [`LogBuffer`].
pub struct TuiLogLayer {
    buffer: LogBuffer,
    min_level: Level,
}

impl TuiLogLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self {
            buffer,
            min_level: Level::INFO,
        }
    }

    /// Set minimum log level to capture.
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }
}

#[derive(Default)]
struct EntryVisitor {
    message: String,
    context: Vec<(String, String)>,
}

impl EntryVisitor {
    fn record(&mut self, field: &Field, value: String) {
        let name = field.name();
        if name == "message" {
            self.message = value;
        } else if CONTEXT_FIELDS.contains(&name) {
            self.context.push((name.to_string(), value));
        }
    }

    fn finish(mut self) -> (String, Vec<(String, String)>) {
        self.context.sort_by_key(|(k, _)| {
            CONTEXT_FIELDS
                .iter()
                .position(|f| f == k)
                .unwrap_or(usize::MAX)
        });
        (self.message, self.context)
    }
}

impl Visit for EntryVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut text = format!("{:?}", value);
        if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            text = text[1..text.len() - 1].to_string();
        }
        self.record(field, text);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }
}

impl<S: Subscriber> Layer<S> for TuiLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > self.min_level {
            return;
        }

        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);
        let (message, context) = visitor.finish();

        self.buffer.push(LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message,
            context,
        });
    }
}
