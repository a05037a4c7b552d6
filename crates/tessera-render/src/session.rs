//! Rendering sessions.
//!
//! A [`RenderSession`] mounts one validated config and owns everything that
//! changes while a user interacts with it: the state bag, the viewing
//! principal, per-component uncommitted input and the set of currently
//! visible components. All state mutation goes through the merge step here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};
use tessera_types::{
    Action, ActionKind, Component, ComponentOptions, FormOptions, Handler, Principal, State,
    StatePatch, ValidatedConfig,
};

use crate::action::{ActionDispatcher, ActionOutcome, PreparedAction};
use crate::binding::{RefreshTarget, resolve_binding};
use crate::error::{Result, SessionError};
use crate::layout::{RenderTree, RenderedComponent, compose};
use crate::visibility::{evaluate_in, is_component_visible};
use crate::widget::{WidgetContext, WidgetRegistry};

/// One mounted UI config and its mutable session data.
#[derive(Debug)]
pub struct RenderSession {
    config: Arc<ValidatedConfig>,
    widgets: WidgetRegistry,
    state: State,
    principal: Option<Principal>,
    local_inputs: HashMap<String, Map<String, Value>>,
    visible: HashSet<String>,
}

impl RenderSession {
    /// Mount a config with an initial state, using the built-in widgets.
    pub fn new(config: impl Into<Arc<ValidatedConfig>>, state: State) -> Self {
        let mut session = Self {
            config: config.into(),
            widgets: WidgetRegistry::builtin(),
            state,
            principal: None,
            local_inputs: HashMap::new(),
            visible: HashSet::new(),
        };
        session.visible = session.compute_visible();
        tracing::debug!(
            config = %session.config.id(),
            components = session.config.components().len(),
            visible = session.visible.len(),
            "Mounted UI config"
        );
        session
    }

    /// Replace the widget registry.
    pub fn with_widgets(mut self, widgets: WidgetRegistry) -> Self {
        self.widgets = widgets;
        self
    }

    /// Set the viewing principal.
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.set_principal(Some(principal));
        self
    }

    /// Change the viewing principal and re-evaluate visibility.
    pub fn set_principal(&mut self, principal: Option<Principal>) {
        self.principal = principal;
        self.refresh_visibility();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    /// Whether a component is currently visible.
    pub fn is_visible(&self, component_id: &str) -> bool {
        self.visible.contains(component_id)
    }

    /// Visible components in layout order.
    pub fn visible_components(&self) -> Vec<&Component> {
        self.config
            .components()
            .iter()
            .filter(|c| self.visible.contains(&c.id))
            .collect()
    }

    /// Uncommitted input for a component.
    pub fn local_input(&self, component_id: &str) -> Option<&Map<String, Value>> {
        self.local_inputs.get(component_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Local input
    // ─────────────────────────────────────────────────────────────────────────

    /// Record an uncommitted input value for a visible component.
    pub fn set_local_input(&mut self, component_id: &str, field: impl Into<String>, value: Value) -> Result<()> {
        self.require_visible(component_id)?;
        self.local_inputs
            .entry(component_id.to_string())
            .or_default()
            .insert(field.into(), value);
        Ok(())
    }

    /// Drop a component's uncommitted input.
    pub fn clear_local_input(&mut self, component_id: &str) {
        self.local_inputs.remove(component_id);
    }

    /// Merge a component's uncommitted input into state and clear it.
    ///
    /// Form inputs for fields that are currently hidden are discarded.
    pub fn commit_local_input(&mut self, component_id: &str) -> Result<Vec<String>> {
        self.require_visible(component_id)?;
        let patch = self.pending_commit(component_id);
        self.local_inputs.remove(component_id);
        Ok(self.merge(patch, "commit"))
    }

    /// The patch committing a component's local input would produce.
    fn pending_commit(&self, component_id: &str) -> StatePatch {
        let Some(input) = self.local_inputs.get(component_id) else {
            return StatePatch::new();
        };

        match self.config.options(component_id) {
            Some(ComponentOptions::Form(form)) => visible_field_values(form, &self.state, input),
            _ => input.clone(),
        }
    }

    /// Drop local input that a finished submit carried. Values edited after
    /// the action was prepared stay pending.
    fn release_committed_input(&mut self, component_id: &str, committed: &StatePatch) {
        let Some(input) = self.local_inputs.get_mut(component_id) else {
            return;
        };
        input.retain(|field, value| committed.get(field.as_str()) != Some(&*value));
        if input.is_empty() {
            self.local_inputs.remove(component_id);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State updates
    // ─────────────────────────────────────────────────────────────────────────

    /// Shallow-merge a patch into state. Returns the keys that changed.
    pub fn apply_patch(&mut self, patch: StatePatch) -> Vec<String> {
        self.merge(patch, "patch")
    }

    /// Merge data pushed or fetched by the host (realtime updates, `api`
    /// binding refreshes).
    pub fn apply_external_update(&mut self, patch: StatePatch) -> Vec<String> {
        self.merge(patch, "external")
    }

    /// Apply the result of a prepared action: submitted input first, then
    /// the handler's patch.
    pub fn complete(&mut self, prepared: &PreparedAction, outcome: &ActionOutcome) -> Vec<String> {
        let mut changed = Vec::new();
        if let Some(committed) = &prepared.committed {
            self.release_committed_input(&prepared.component_id, committed);
            changed.extend(self.merge(committed.clone(), "commit"));
        }
        if let ActionOutcome::Patch(patch) = outcome {
            for key in self.merge(patch.clone(), "action") {
                if !changed.contains(&key) {
                    changed.push(key);
                }
            }
        }
        changed
    }

    fn merge(&mut self, patch: StatePatch, origin: &'static str) -> Vec<String> {
        if patch.is_empty() {
            return Vec::new();
        }
        let changed = self.state.merge(patch);
        tracing::debug!(origin, changed = ?changed, "Merged state patch");
        if !changed.is_empty() {
            self.refresh_visibility();
        }
        changed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Visibility
    // ─────────────────────────────────────────────────────────────────────────

    fn compute_visible(&self) -> HashSet<String> {
        self.config
            .components()
            .iter()
            .filter(|c| is_component_visible(c, &self.state, self.principal.as_ref()))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Re-evaluate visibility; components that just appeared lose any stale
    /// uncommitted input.
    fn refresh_visibility(&mut self) {
        let visible = self.compute_visible();
        for id in visible.difference(&self.visible) {
            if self.local_inputs.remove(id).is_some() {
                tracing::debug!(component = %id, "Discarded stale input of re-shown component");
            }
        }
        self.visible = visible;
    }

    fn require_visible(&self, component_id: &str) -> Result<&Component> {
        let component = self
            .config
            .component(component_id)
            .ok_or_else(|| SessionError::UnknownComponent(component_id.to_string()))?;
        if !self.visible.contains(component_id) {
            return Err(SessionError::NotVisible(component_id.to_string()));
        }
        Ok(component)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve an action and snapshot the state it runs against.
    ///
    /// For `submit` actions the snapshot includes the component's local
    /// input; that input is committed to the session only when the outcome
    /// is applied with [`RenderSession::complete`].
    pub fn prepare_action(&self, component_id: &str, action_id: &str) -> Result<PreparedAction> {
        self.require_visible(component_id)?;
        let action = self
            .config
            .action(component_id, action_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownAction {
                component: component_id.to_string(),
                action: action_id.to_string(),
            })?;

        let mut state = self.state.snapshot();
        let committed = if action.kind == ActionKind::Submit {
            let patch = self.pending_commit(component_id);
            state.merge(patch.clone());
            Some(patch)
        } else {
            None
        };

        Ok(PreparedAction {
            component_id: component_id.to_string(),
            action,
            state,
            committed,
            payload: None,
        })
    }

    /// Resolve a table row action. Row actions name a custom handler and
    /// pass the row as payload.
    pub fn prepare_row_action(&self, component_id: &str, handler: &str, row: Value) -> Result<PreparedAction> {
        self.require_visible(component_id)?;
        let unknown = || SessionError::UnknownAction {
            component: component_id.to_string(),
            action: handler.to_string(),
        };

        let row_action = match self.config.options(component_id) {
            Some(ComponentOptions::Table(t) | ComponentOptions::DataGrid(t)) => t
                .row_actions
                .iter()
                .find(|a| a.handler == handler)
                .ok_or_else(unknown)?,
            _ => return Err(unknown()),
        };

        let mut action = Action::new(handler, &row_action.label, Handler::custom(handler))
            .with_kind(ActionKind::Custom);
        action.style = row_action.style;

        Ok(PreparedAction {
            component_id: component_id.to_string(),
            action,
            state: self.state.snapshot(),
            committed: None,
            payload: Some(row),
        })
    }

    /// Run an action to completion and merge its outcome.
    ///
    /// On error the state and local input are left untouched.
    pub async fn dispatch(
        &mut self,
        dispatcher: &ActionDispatcher,
        component_id: &str,
        action_id: &str,
    ) -> Result<ActionOutcome> {
        let prepared = self.prepare_action(component_id, action_id)?;
        self.run(dispatcher, prepared).await
    }

    /// Run a prepared action to completion and merge its outcome.
    pub async fn run(&mut self, dispatcher: &ActionDispatcher, prepared: PreparedAction) -> Result<ActionOutcome> {
        match dispatcher.execute(&prepared).await {
            Ok(outcome) => {
                self.complete(&prepared, &outcome);
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(
                    component = %prepared.component_id,
                    action = %prepared.action.id,
                    error = %e,
                    "Action failed, state unchanged"
                );
                Err(SessionError::Dispatch(e))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// `api` bindings of visible components, for the host to fetch.
    pub fn refresh_targets(&self) -> Vec<RefreshTarget> {
        self.visible_components()
            .into_iter()
            .filter_map(RefreshTarget::for_component)
            .collect()
    }

    /// Render the current state.
    pub fn render(&self) -> RenderTree {
        let config = self.config.config();
        let visible = self.visible_components();
        let no_input = Map::new();

        let root = compose(config.layout.kind, &visible, |component| {
            self.render_component(component, &no_input)
        });

        RenderTree {
            config_id: config.id.clone(),
            version: config.version.clone(),
            theme: config.theme.clone(),
            root,
        }
    }

    fn render_component(&self, component: &Component, no_input: &Map<String, Value>) -> Option<RenderedComponent> {
        let options = self.config.options(&component.id)?;
        let ctx = WidgetContext {
            component,
            options,
            data: resolve_binding(component, &self.state),
            state: &self.state,
            local_input: self.local_inputs.get(&component.id).unwrap_or(no_input),
        };
        let view = self.widgets.render(&ctx)?;

        Some(RenderedComponent {
            id: component.id.clone(),
            kind: component.kind.clone(),
            title: options.title().or(component.title()).map(str::to_string),
            view,
            actions: self.config.actions(&component.id).into_iter().cloned().collect(),
        })
    }
}

/// Values of the form's visible fields. Visibility sees the state overlaid
/// with the input being committed.
fn visible_field_values(form: &FormOptions, state: &State, input: &Map<String, Value>) -> StatePatch {
    let mut scope = state.as_map().clone();
    scope.extend(input.iter().map(|(k, v)| (k.clone(), v.clone())));

    form.fields
        .iter()
        .filter(|f| f.visibility.as_ref().is_none_or(|v| evaluate_in(&v.conditions, &scope)))
        .filter_map(|f| input.get(&f.id).map(|v| (f.id.clone(), v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_types::{UiConfig, ValidationOptions};

    fn session(config: Value, state: Value) -> RenderSession {
        let config: UiConfig = serde_json::from_value(config).unwrap();
        let config = config.validate(ValidationOptions::default()).unwrap();
        RenderSession::new(config, State::from_value(state))
    }

    fn gated_config() -> Value {
        json!({
            "id": "gated",
            "layout": {
                "type": "tabs",
                "components": [
                    { "id": "toggle", "type": "form",
                      "config": { "fields": [{ "id": "mode", "type": "text" }] },
                      "actions": [
                          { "id": "show", "label": "Show", "handler": { "type": "state", "config": { "stateUpdate": { "open": true } } } },
                          { "id": "hide", "label": "Hide", "handler": { "type": "state", "config": { "stateUpdate": { "open": false } } } }
                      ] },
                    { "id": "details", "type": "form",
                      "config": { "fields": [{ "id": "note", "type": "text" }] },
                      "visibility": { "conditions": [{ "field": "open", "operator": "eq", "value": true }] },
                      "actions": [
                          { "id": "save", "type": "submit", "label": "Save",
                            "handler": { "type": "state", "config": { "stateUpdate": { "saved": true } } } }
                      ] }
                ]
            }
        })
    }

    #[tokio::test]
    async fn test_reshown_component_drops_stale_input() {
        let mut s = session(gated_config(), json!({ "open": true }));
        let dispatcher = ActionDispatcher::new();

        s.set_local_input("details", "note", json!("draft")).unwrap();
        s.dispatch(&dispatcher, "toggle", "hide").await.unwrap();
        assert!(!s.is_visible("details"));
        assert!(matches!(
            s.set_local_input("details", "note", json!("x")),
            Err(SessionError::NotVisible(_))
        ));

        s.dispatch(&dispatcher, "toggle", "show").await.unwrap();
        assert!(s.is_visible("details"));
        assert!(s.local_input("details").is_none());
    }

    #[tokio::test]
    async fn test_submit_commits_local_input() {
        let mut s = session(gated_config(), json!({ "open": true }));
        s.set_local_input("details", "note", json!("hello")).unwrap();

        let prepared = s.prepare_action("details", "save").unwrap();
        assert_eq!(prepared.state.get("note"), Some(&json!("hello")));
        assert!(s.state().get("note").is_none());

        s.run(&ActionDispatcher::new(), prepared).await.unwrap();
        assert_eq!(s.state().get("note"), Some(&json!("hello")));
        assert_eq!(s.state().get("saved"), Some(&json!(true)));
        assert!(s.local_input("details").is_none());
    }

    #[tokio::test]
    async fn test_edits_during_submit_stay_pending() {
        let mut s = session(gated_config(), json!({ "open": true }));
        let dispatcher = ActionDispatcher::new();
        s.set_local_input("details", "note", json!("first")).unwrap();

        let prepared = s.prepare_action("details", "save").unwrap();
        s.set_local_input("details", "note", json!("second")).unwrap();
        let outcome = dispatcher.execute(&prepared).await.unwrap();
        s.complete(&prepared, &outcome);

        assert_eq!(s.state().get("note"), Some(&json!("first")));
        assert_eq!(s.local_input("details").and_then(|i| i.get("note")), Some(&json!("second")));

        let prepared = s.prepare_action("details", "save").unwrap();
        s.run(&dispatcher, prepared).await.unwrap();
        assert_eq!(s.state().get("note"), Some(&json!("second")));
        assert!(s.local_input("details").is_none());
    }

    #[test]
    fn test_commit_discards_hidden_form_fields() {
        let mut s = session(
            json!({
                "id": "c",
                "layout": { "type": "single", "components": [
                    { "id": "f", "type": "form", "config": { "fields": [
                        { "id": "source_type", "type": "select" },
                        { "id": "cloud_path", "type": "text",
                          "visibility": { "conditions": [{ "field": "source_type", "operator": "neq", "value": "upload" }] } }
                    ] } }
                ] }
            }),
            json!({}),
        );
        s.set_local_input("f", "cloud_path", json!("/drive/a.pdf")).unwrap();
        s.set_local_input("f", "source_type", json!("upload")).unwrap();

        let changed = s.commit_local_input("f").unwrap();
        assert_eq!(changed, vec!["source_type".to_string()]);
        assert!(s.state().get("cloud_path").is_none());
    }

    #[test]
    fn test_unknown_component_and_action() {
        let s = session(gated_config(), json!({}));
        assert!(matches!(s.prepare_action("nope", "x"), Err(SessionError::UnknownComponent(_))));
        assert!(matches!(s.prepare_action("toggle", "nope"), Err(SessionError::UnknownAction { .. })));
        assert!(matches!(s.prepare_action("details", "save"), Err(SessionError::NotVisible(_))));
    }

    #[test]
    fn test_patch_is_shallow_and_idempotent() {
        let mut s = session(gated_config(), json!({ "a": 0, "b": 2 }));
        let mut patch = StatePatch::new();
        patch.insert("a".to_string(), json!(1));

        assert_eq!(s.apply_patch(patch.clone()), vec!["a".to_string()]);
        let once = s.state().clone();
        assert!(s.apply_patch(patch).is_empty());
        assert_eq!(s.state(), &once);
        assert_eq!(s.state().to_value(), json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn test_render_tabs_and_titles() {
        let s = session(gated_config(), json!({ "open": true }));
        let tree = s.render();
        let ids: Vec<&str> = tree.components().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["toggle", "details"]);
        assert_eq!(tree.component("toggle").map(|c| c.actions.len()), Some(2));

        let s = session(gated_config(), json!({}));
        assert_eq!(s.render().components().len(), 1);
    }

    #[test]
    fn test_refresh_targets_only_for_visible_api_bindings() {
        let s = session(
            json!({
                "id": "r",
                "layout": { "type": "dashboard", "components": [
                    { "id": "stats", "type": "stats", "data": { "source": "api", "endpoint": "/api/stats", "refreshInterval": 1000 } },
                    { "id": "hidden", "type": "stats",
                      "data": { "source": "api", "endpoint": "/api/hidden" },
                      "visibility": { "conditions": [{ "field": "never", "operator": "exists" }] } },
                    { "id": "local", "type": "stats", "data": { "source": "state", "stateKey": "k" } }
                ] }
            }),
            json!({}),
        );
        let targets = s.refresh_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].endpoint, "/api/stats");
    }

    #[test]
    fn test_principal_changes_visibility() {
        let mut s = session(
            json!({
                "id": "p",
                "layout": { "type": "single", "components": [
                    { "id": "admin", "type": "stats", "visibility": { "roles": ["admin"] } }
                ] }
            }),
            json!({}),
        );
        assert!(!s.is_visible("admin"));
        s.set_principal(Some(Principal::new("u").with_role("admin")));
        assert!(s.is_visible("admin"));
    }
}
