//! Application state and main loop.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use serde_json::{Number, Value};
use tessera_client::TesseraClient;
use tessera_render::{
    ActionDispatchError, ActionDispatcher, ActionOutcome, FieldView, PreparedAction, RefreshTarget,
    RenderSession, RenderTree, RenderedComponent, WidgetView, display_value,
};
use tessera_types::FieldKind;
use tokio::sync::mpsc;

use crate::Tui;
use crate::logs::LogBuffer;
use crate::ui;

/// Which pane handles input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Navigating and editing the rendered components.
    #[default]
    Components,
    /// Scrolling the logs panel (Ctrl+L).
    Logs,
}

/// What an in-progress text edit writes to when confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// A form field of the given kind.
    Field { id: String, kind: FieldKind },
    /// A file name appended to a file upload's selection.
    UploadFile,
}

/// An in-progress text edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editing {
    pub component: String,
    pub target: EditTarget,
    pub buffer: String,
}

/// Result of a background task, delivered back to the main loop.
#[derive(Debug)]
pub enum TaskResult {
    Action {
        prepared: PreparedAction,
        result: Result<ActionOutcome, ActionDispatchError>,
    },
    Data {
        target: RefreshTarget,
        result: Result<Value, String>,
    },
}

/// Main application state.
pub struct App {
    /// The mounted config, its state and local input.
    pub session: RenderSession,
    /// Latest render of the session.
    pub tree: RenderTree,
    dispatcher: Arc<ActionDispatcher>,
    /// Client for `api` data bindings; bindings are not fetched without one.
    client: Option<TesseraClient>,
    pub focus: Focus,
    /// Index of the focused component in [`RenderTree::components`].
    pub selected: usize,
    /// Per-component field or row cursor.
    pub cursors: HashMap<String, usize>,
    /// Selected row action of the focused table.
    pub row_action: usize,
    pub editing: Option<Editing>,
    pub status_message: Option<String>,
    /// Actions dispatched and not yet completed.
    pub in_flight: usize,
    pub show_logs: bool,
    pub log_buffer: LogBuffer,
    pub log_scroll: usize,
    pub should_quit: bool,
    last_fetch: HashMap<String, Instant>,
    fetching: HashSet<String>,
    tx: mpsc::UnboundedSender<TaskResult>,
    rx: mpsc::UnboundedReceiver<TaskResult>,
}

impl App {
    /// Create the app around a session.
    pub fn new(
        session: RenderSession,
        dispatcher: ActionDispatcher,
        client: Option<TesseraClient>,
        log_buffer: LogBuffer,
    ) -> Self {
        let tree = session.render();
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            tree,
            dispatcher: Arc::new(dispatcher),
            client,
            focus: Focus::default(),
            selected: 0,
            cursors: HashMap::new(),
            row_action: 0,
            editing: None,
            status_message: None,
            in_flight: 0,
            show_logs: false,
            log_buffer,
            log_scroll: 0,
            should_quit: false,
            last_fetch: HashMap::new(),
            fetching: HashSet::new(),
            tx,
            rx,
        }
    }

    /// Run the main loop until the user quits.
    pub async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut input = EventStream::new();
        self.refresh_bindings(Instant::now());

        while !self.should_quit {
            terminal.draw(|frame| ui::render(self, frame))?;

            // Sleep until the next binding is due; with no client or no
            // interval bindings only input and task results wake the loop.
            let wake = match self.client {
                Some(_) => self.refresh_delay(Instant::now()),
                None => None,
            };
            let refresh_due = async {
                match wake {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                event = input.next() => match event {
                    // Windows reports releases too
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    // Resizes and other events just redraw
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                Some(result) = self.rx.recv() => self.handle_task_result(result),
                () = refresh_due => self.refresh_bindings(Instant::now()),
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-render after the session changed.
    fn rerender(&mut self) {
        self.tree = self.session.render();
        let count = self.tree.components().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    /// The focused rendered component.
    pub fn focused(&self) -> Option<&RenderedComponent> {
        self.tree.components().get(self.selected).copied()
    }

    /// Cursor position inside a component.
    pub fn cursor(&self, component_id: &str) -> usize {
        self.cursors.get(component_id).copied().unwrap_or(0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key handling
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('c') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('l') => {
                    self.show_logs = !self.show_logs;
                    self.focus = if self.show_logs { Focus::Logs } else { Focus::Components };
                    return;
                }
                _ => {}
            }
        }

        if self.editing.is_some() {
            self.handle_edit_key(key);
            return;
        }

        match self.focus {
            Focus::Logs => self.handle_logs_key(key),
            Focus::Components => self.handle_component_key(key),
        }
    }

    fn handle_logs_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.log_scroll = self.log_scroll.saturating_sub(1),
            KeyCode::Down => self.log_scroll = self.log_scroll.saturating_add(1),
            KeyCode::Esc => {
                self.show_logs = false;
                self.focus = Focus::Components;
            }
            _ => {}
        }
    }

    fn handle_component_key(&mut self, key: KeyEvent) {
        let count = self.tree.components().len();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab if count > 0 => {
                self.selected = (self.selected + 1) % count;
                self.row_action = 0;
            }
            KeyCode::BackTab if count > 0 => {
                self.selected = (self.selected + count - 1) % count;
                self.row_action = 0;
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Left => self.step(-1),
            KeyCode::Right => self.step(1),
            KeyCode::Enter => self.activate(),
            KeyCode::Char('r') => {
                self.last_fetch.clear();
                self.status_message = Some("Refreshing data".to_string());
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.trigger_action(index);
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.editing = None,
            KeyCode::Enter => {
                if let Some(editing) = self.editing.take() {
                    self.commit_edit(editing);
                }
            }
            KeyCode::Backspace => {
                if let Some(editing) = self.editing.as_mut() {
                    editing.buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(editing) = self.editing.as_mut() {
                    editing.buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let Some(component) = self.focused() else {
            return;
        };
        let len = match &component.view {
            WidgetView::Form { fields, .. } => fields.len(),
            WidgetView::Table { rows, .. } => rows.len(),
            _ => 0,
        };
        if len == 0 {
            return;
        }
        let id = component.id.clone();
        let next = (self.cursor(&id) as isize + delta).clamp(0, len as isize - 1) as usize;
        self.cursors.insert(id, next);
    }

    /// Left/Right: cycle a select field, move a wizard or pick a row action.
    fn step(&mut self, delta: isize) {
        let Some(component) = self.focused().cloned() else {
            return;
        };
        match &component.view {
            WidgetView::Form { fields, .. } => {
                if let Some(field) = fields.get(self.cursor(&component.id))
                    && field.kind == FieldKind::Select
                {
                    self.cycle_select(&component.id, field, delta);
                }
            }
            WidgetView::Wizard { steps, current } => {
                let last = steps.len().saturating_sub(1) as isize;
                let next = (*current as isize + delta).clamp(0, last);
                self.set_input(&component.id, "step", Value::from(next as u64));
            }
            WidgetView::Table { row_actions, .. } if !row_actions.is_empty() => {
                let len = row_actions.len() as isize;
                self.row_action = (self.row_action as isize + delta).rem_euclid(len) as usize;
            }
            _ => {}
        }
    }

    /// Enter: edit or toggle a form field, run a row action or add a file.
    fn activate(&mut self) {
        let Some(component) = self.focused().cloned() else {
            return;
        };
        let cursor = self.cursor(&component.id);
        match &component.view {
            WidgetView::Form { fields, .. } => {
                let Some(field) = fields.get(cursor) else {
                    return;
                };
                match field.kind {
                    FieldKind::Select => self.cycle_select(&component.id, field, 1),
                    FieldKind::Checkbox => {
                        let checked = field.value.as_ref().and_then(Value::as_bool).unwrap_or(false);
                        self.set_input(&component.id, &field.id, Value::Bool(!checked));
                    }
                    kind => {
                        self.editing = Some(Editing {
                            component: component.id.clone(),
                            target: EditTarget::Field {
                                id: field.id.clone(),
                                kind,
                            },
                            buffer: field.value.as_ref().map(display_value).unwrap_or_default(),
                        });
                    }
                }
            }
            WidgetView::Table {
                records,
                row_actions,
                ..
            } => {
                let (Some(row), Some(action)) = (records.get(cursor), row_actions.get(self.row_action))
                else {
                    return;
                };
                match self.session.prepare_row_action(&component.id, &action.handler, row.clone()) {
                    Ok(prepared) => self.spawn_action(prepared),
                    Err(e) => self.status_message = Some(format!("✗ {}", e)),
                }
            }
            WidgetView::FileUpload { .. } => {
                self.editing = Some(Editing {
                    component: component.id.clone(),
                    target: EditTarget::UploadFile,
                    buffer: String::new(),
                });
            }
            _ => {}
        }
    }

    fn cycle_select(&mut self, component_id: &str, field: &FieldView, delta: isize) {
        if field.options.is_empty() {
            return;
        }
        let len = field.options.len() as isize;
        let next = match field
            .options
            .iter()
            .position(|o| Some(&o.value) == field.value.as_ref())
        {
            Some(i) => (i as isize + delta).rem_euclid(len) as usize,
            None => 0,
        };
        let value = field.options[next].value.clone();
        self.set_input(component_id, &field.id, value);
    }

    fn commit_edit(&mut self, editing: Editing) {
        match editing.target {
            EditTarget::Field { id, kind } => {
                let value = parse_input(&editing.buffer, kind);
                self.set_input(&editing.component, &id, value);
            }
            EditTarget::UploadFile => {
                let name = editing.buffer.trim();
                if name.is_empty() {
                    return;
                }
                let multiple = matches!(
                    self.tree.component(&editing.component).map(|c| &c.view),
                    Some(WidgetView::FileUpload { multiple: true, .. })
                );
                let mut files = match self.session.local_input(&editing.component).and_then(|i| i.get("files")) {
                    Some(Value::Array(files)) if multiple => files.clone(),
                    _ => Vec::new(),
                };
                files.push(Value::String(name.to_string()));
                self.set_input(&editing.component, "files", Value::Array(files));
            }
        }
    }

    fn set_input(&mut self, component_id: &str, field: &str, value: Value) {
        if let Err(e) = self.session.set_local_input(component_id, field, value) {
            self.status_message = Some(format!("✗ {}", e));
            return;
        }
        self.rerender();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    fn trigger_action(&mut self, index: usize) {
        let Some(component) = self.focused() else {
            return;
        };
        let Some(action) = component.actions.get(index) else {
            return;
        };
        let (component_id, action_id) = (component.id.clone(), action.id.clone());
        match self.session.prepare_action(&component_id, &action_id) {
            Ok(prepared) => self.spawn_action(prepared),
            Err(e) => self.status_message = Some(format!("✗ {}", e)),
        }
    }

    /// Run an action in the background; its outcome arrives as a
    /// [`TaskResult::Action`].
    fn spawn_action(&mut self, prepared: PreparedAction) {
        self.in_flight += 1;
        self.status_message = Some(format!("Running {}...", prepared.action.label));
        let dispatcher = Arc::clone(&self.dispatcher);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = dispatcher.execute(&prepared).await;
            let _ = tx.send(TaskResult::Action { prepared, result });
        });
    }

    /// Apply a finished background task to the session.
    pub fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Action { prepared, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let label = &prepared.action.label;
                match result {
                    Ok(outcome) => {
                        self.session.complete(&prepared, &outcome);
                        self.status_message = Some(match &outcome {
                            ActionOutcome::Navigate(intent) => format!("→ {}", intent.url),
                            _ => format!("✓ {}", label),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            component = %prepared.component_id,
                            action = %prepared.action.id,
                            error = %e,
                            "Action failed, state unchanged"
                        );
                        self.status_message = Some(format!("✗ {}: {}", label, e));
                    }
                }
            }
            TaskResult::Data { target, result } => {
                self.fetching.remove(&target.component_id);
                match result {
                    Ok(value) => {
                        self.session.apply_external_update(target.patch(value));
                    }
                    Err(e) => {
                        tracing::warn!(
                            component = %target.component_id,
                            endpoint = %target.endpoint,
                            error = %e,
                            "Binding refresh failed"
                        );
                    }
                }
            }
        }
        self.rerender();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Data bindings
    // ─────────────────────────────────────────────────────────────────────────

    /// Bindings due for a fetch: never fetched, or past their interval.
    pub fn due_targets(&self, now: Instant) -> Vec<RefreshTarget> {
        self.session
            .refresh_targets()
            .into_iter()
            .filter(|t| !self.fetching.contains(&t.component_id))
            .filter(|t| match (self.last_fetch.get(&t.component_id), t.interval) {
                (None, _) => true,
                (Some(at), Some(interval)) => now.duration_since(*at) >= interval,
                (Some(_), None) => false,
            })
            .collect()
    }

    /// Time until the earliest `api` binding falls due. `None` when every
    /// binding is in flight or fetch-once and already fetched.
    pub fn refresh_delay(&self, now: Instant) -> Option<Duration> {
        self.session
            .refresh_targets()
            .into_iter()
            .filter(|t| !self.fetching.contains(&t.component_id))
            .filter_map(|t| match self.last_fetch.get(&t.component_id) {
                None => Some(Duration::ZERO),
                Some(at) => t.interval.map(|interval| (*at + interval).saturating_duration_since(now)),
            })
            .min()
    }

    fn refresh_bindings(&mut self, now: Instant) {
        let Some(client) = self.client.clone() else {
            return;
        };
        for target in self.due_targets(now) {
            self.last_fetch.insert(target.component_id.clone(), now);
            self.fetching.insert(target.component_id.clone());

            let data = client.data();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let result = data.fetch(&target.endpoint).await.map_err(|e| e.to_string());
                let _ = tx.send(TaskResult::Data { target, result });
            });
        }
    }
}

/// Convert typed text to a field value.
fn parse_input(buffer: &str, kind: FieldKind) -> Value {
    if kind == FieldKind::Number
        && let Some(n) = buffer.trim().parse::<f64>().ok().and_then(Number::from_f64)
    {
        return Value::Number(n);
    }
    Value::String(buffer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tessera_render::{CustomCall, CustomHandler, CustomHandlerRegistry};
    use tessera_types::{State, StatePatch, UiConfig, ValidationOptions};

    /// Copies the submitted `name` into `greeting`.
    struct Echo;

    #[async_trait]
    impl CustomHandler for Echo {
        fn name(&self) -> &str {
            "greet"
        }

        async fn call(&self, call: CustomCall) -> Result<StatePatch, String> {
            let name = call.state.get("name").cloned().unwrap_or_default();
            let mut patch = StatePatch::new();
            patch.insert("greeting".to_string(), name);
            Ok(patch)
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let config: UiConfig = serde_json::from_value(json!({
            "id": "greeter",
            "layout": { "type": "tabs", "components": [
                { "id": "form", "type": "form",
                  "config": { "fields": [
                      { "id": "name", "type": "text", "label": "Name" },
                      { "id": "tone", "type": "select", "label": "Tone",
                        "options": [{ "value": "warm", "label": "Warm" }, { "value": "dry", "label": "Dry" }] }
                  ] },
                  "actions": [{ "id": "go", "type": "submit", "label": "Greet",
                                "handler": { "type": "custom", "config": { "customFunction": "greet" } } }] },
                { "id": "wizard", "type": "wizard",
                  "config": { "steps": [{ "id": "a", "title": "A" }, { "id": "b", "title": "B" }] } }
            ] }
        }))
        .unwrap();
        let session = RenderSession::new(
            config.validate(ValidationOptions::default()).unwrap(),
            State::new(),
        );
        let mut handlers = CustomHandlerRegistry::new();
        handlers.register(Echo);
        App::new(
            session,
            ActionDispatcher::new().with_custom_handlers(handlers),
            None,
            LogBuffer::new(),
        )
    }

    #[test]
    fn test_edit_text_field() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        assert!(app.editing.is_some());
        for c in "Ada".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert!(app.editing.is_none());
        assert_eq!(
            app.session.local_input("form").and_then(|i| i.get("name")),
            Some(&json!("Ada"))
        );
    }

    #[test]
    fn test_select_cycles_options() {
        let mut app = app();
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(
            app.session.local_input("form").and_then(|i| i.get("tone")),
            Some(&json!("dry"))
        );
        app.handle_key(key(KeyCode::Right));
        assert_eq!(
            app.session.local_input("form").and_then(|i| i.get("tone")),
            Some(&json!("warm"))
        );
    }

    #[test]
    fn test_tab_moves_focus_and_wizard_steps() {
        let mut app = app();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focused().unwrap().id, "wizard");

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        assert!(matches!(app.focused().unwrap().view, WidgetView::Wizard { current: 1, .. }));

        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.focused().unwrap().id, "form");
    }

    #[test]
    fn test_number_input_parsing() {
        assert_eq!(parse_input("42", FieldKind::Number), json!(42.0));
        assert_eq!(parse_input("4x", FieldKind::Number), json!("4x"));
        assert_eq!(parse_input("42", FieldKind::Text), json!("42"));
    }

    #[tokio::test]
    async fn test_submit_action_completes_in_background() {
        let mut app = app();
        app.session.set_local_input("form", "name", json!("Ada")).unwrap();

        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.in_flight, 1);

        let result = app.rx.recv().await.unwrap();
        app.handle_task_result(result);

        assert_eq!(app.in_flight, 0);
        assert_eq!(app.session.state().get("greeting"), Some(&json!("Ada")));
        assert_eq!(app.session.state().get("name"), Some(&json!("Ada")));
        assert_eq!(app.status_message.as_deref(), Some("✓ Greet"));
    }

    #[test]
    fn test_due_targets_respect_interval() {
        let config: UiConfig = serde_json::from_value(json!({
            "id": "bound",
            "layout": { "type": "single", "components": [
                { "id": "stats", "type": "stats",
                  "data": { "source": "api", "endpoint": "/stats", "refreshInterval": 1000 } }
            ] }
        }))
        .unwrap();
        let session = RenderSession::new(config.validate(ValidationOptions::default()).unwrap(), State::new());
        let mut app = App::new(session, ActionDispatcher::new(), None, LogBuffer::new());

        let now = Instant::now();
        assert_eq!(app.due_targets(now).len(), 1);

        app.last_fetch.insert("stats".to_string(), now);
        assert!(app.due_targets(now).is_empty());
        assert_eq!(app.due_targets(now + std::time::Duration::from_secs(2)).len(), 1);
    }

    #[test]
    fn test_refresh_delay_tracks_earliest_binding() {
        let config: UiConfig = serde_json::from_value(json!({
            "id": "bound",
            "layout": { "type": "split", "components": [
                { "id": "fast", "type": "stats",
                  "data": { "source": "api", "endpoint": "/fast", "refreshInterval": 1000 } },
                { "id": "once", "type": "stats",
                  "data": { "source": "api", "endpoint": "/once" } }
            ] }
        }))
        .unwrap();
        let session = RenderSession::new(config.validate(ValidationOptions::default()).unwrap(), State::new());
        let mut app = App::new(session, ActionDispatcher::new(), None, LogBuffer::new());

        let now = Instant::now();
        assert_eq!(app.refresh_delay(now), Some(Duration::ZERO));

        app.last_fetch.insert("fast".to_string(), now);
        app.last_fetch.insert("once".to_string(), now);
        assert_eq!(app.refresh_delay(now + Duration::from_millis(400)), Some(Duration::from_millis(600)));
        assert_eq!(app.refresh_delay(now + Duration::from_secs(5)), Some(Duration::ZERO));

        app.fetching.insert("fast".to_string());
        assert_eq!(app.refresh_delay(now), None);
    }
}
