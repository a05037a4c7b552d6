//! Action dispatch.
//!
//! [`ActionDispatcher`] runs exactly one handler per invocation and reports
//! what the session should do with the result:
//!
//! - `api`: sends the state snapshot as the JSON body through a [`Transport`]
//!   and returns the response object as a patch
//! - `state`: returns the configured `stateUpdate` verbatim
//! - `navigation`: returns a [`NavigationIntent`] for the host
//! - `custom`: calls a host-registered [`CustomHandler`], or does nothing
//!   when none is registered under that name

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tessera_client::TesseraClient;
use tessera_types::{Action, HandlerKind, State, StatePatch};

use crate::error::ActionDispatchError;

/// Method used by `api` handlers that do not declare one.
pub const DEFAULT_METHOD: &str = "POST";

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// Request for the host to navigate elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationIntent {
    pub url: String,
}

/// What a dispatched action produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "camelCase")]
pub enum ActionOutcome {
    /// Top-level keys to merge into state (possibly empty).
    Patch(StatePatch),
    /// The host should navigate; state is unchanged.
    Navigate(NavigationIntent),
    /// Nothing to do.
    NoOp,
}

impl ActionOutcome {
    /// The patch carried by this outcome, if any.
    pub fn patch(&self) -> Option<&StatePatch> {
        match self {
            ActionOutcome::Patch(patch) => Some(patch),
            _ => None,
        }
    }
}

/// An action ready to run: the handler plus the state it runs against.
///
/// Detached from the session so hosts can run it on another task and merge
/// the outcome when it completes.
#[derive(Debug, Clone)]
pub struct PreparedAction {
    pub component_id: String,
    pub action: Action,
    /// State the handler runs against, including any submitted input.
    pub state: State,
    /// Local input a `submit` action commits once the handler succeeds.
    pub committed: Option<StatePatch>,
    /// Extra context for custom handlers, such as the row a row action targets.
    pub payload: Option<Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────────────────────────────────────

/// How a [`Transport`] call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be completed or returned a non-success status.
    Network(String),
    /// The response body was not a JSON object.
    Decode(String),
}

/// Outbound request/response seam used by `api` handlers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `body` to `method url` and return the response object.
    async fn invoke(&self, method: &str, url: &str, body: &Value) -> Result<StatePatch, TransportError>;
}

#[async_trait]
impl Transport for TesseraClient {
    async fn invoke(&self, method: &str, url: &str, body: &Value) -> Result<StatePatch, TransportError> {
        self.actions().invoke(method, url, body).await.map_err(|e| {
            if e.is_decode() {
                TransportError::Decode(e.to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Custom handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Input to a custom handler.
#[derive(Debug, Clone)]
pub struct CustomCall {
    pub component_id: String,
    pub action_id: String,
    pub state: State,
    pub payload: Option<Value>,
}

/// Host-provided handler for `custom` actions and table row actions.
#[async_trait]
pub trait CustomHandler: Send + Sync {
    /// Name referenced by `customFunction` (or a row action's `handler`).
    fn name(&self) -> &str;

    /// Run the handler and return a state patch.
    async fn call(&self, call: CustomCall) -> Result<StatePatch, String>;
}

/// Registry of custom handlers keyed by name.
#[derive(Default, Clone)]
pub struct CustomHandlerRegistry {
    handlers: HashMap<String, Arc<dyn CustomHandler>>,
}

impl CustomHandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any with the same name.
    pub fn register<H: CustomHandler + 'static>(&mut self, handler: H) {
        let name = handler.name().to_string();
        self.handlers.insert(name, Arc::new(handler));
    }

    /// Get a handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CustomHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if a handler exists.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Get all handler names.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for CustomHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomHandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

/// Executes action handlers.
///
/// Invocations are independent: nothing serializes concurrent dispatches,
/// so when several are in flight their patches merge in completion order.
#[derive(Clone, Default)]
pub struct ActionDispatcher {
    transport: Option<Arc<dyn Transport>>,
    custom: CustomHandlerRegistry,
}

impl ActionDispatcher {
    /// A dispatcher with no transport; `api` handlers fail with a network error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transport used by `api` handlers.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the custom handler registry.
    pub fn with_custom_handlers(mut self, custom: CustomHandlerRegistry) -> Self {
        self.custom = custom;
        self
    }

    /// The custom handler registry.
    pub fn custom_handlers(&self) -> &CustomHandlerRegistry {
        &self.custom
    }

    /// Run a prepared action's handler.
    pub async fn execute(&self, prepared: &PreparedAction) -> Result<ActionOutcome, ActionDispatchError> {
        let action = &prepared.action;
        let config = &action.handler.config;
        tracing::debug!(
            component = %prepared.component_id,
            action = %action.id,
            handler = %action.handler.kind,
            "Dispatching action"
        );

        match action.handler.kind {
            HandlerKind::Api => {
                let url = config.url.as_deref().ok_or_else(|| ActionDispatchError::MissingConfig {
                    action: action.id.clone(),
                    field: "url",
                })?;
                let method = config.method.as_deref().unwrap_or(DEFAULT_METHOD);
                self.call_api(method, url, &prepared.state.to_value())
                    .await
                    .map(ActionOutcome::Patch)
            }
            HandlerKind::State => Ok(ActionOutcome::Patch(
                config.state_update.clone().unwrap_or_default(),
            )),
            HandlerKind::Navigation => {
                let url = config.url.clone().ok_or_else(|| ActionDispatchError::MissingConfig {
                    action: action.id.clone(),
                    field: "url",
                })?;
                Ok(ActionOutcome::Navigate(NavigationIntent { url }))
            }
            HandlerKind::Custom => {
                let Some(function) = config.custom_function.as_deref() else {
                    tracing::debug!(action = %action.id, "Custom action names no function, ignoring");
                    return Ok(ActionOutcome::NoOp);
                };
                self.call_custom(function, prepared).await
            }
        }
    }

    async fn call_api(&self, method: &str, url: &str, body: &Value) -> Result<StatePatch, ActionDispatchError> {
        let Some(transport) = &self.transport else {
            return Err(ActionDispatchError::Network {
                url: url.to_string(),
                message: "no transport configured".to_string(),
            });
        };

        match transport.invoke(method, url, body).await {
            Ok(patch) => {
                tracing::debug!(%method, %url, keys = patch.len(), "API handler returned patch");
                Ok(patch)
            }
            Err(TransportError::Network(message)) => {
                tracing::warn!(%method, %url, error = %message, "API handler request failed");
                Err(ActionDispatchError::Network {
                    url: url.to_string(),
                    message,
                })
            }
            Err(TransportError::Decode(message)) => {
                tracing::warn!(%method, %url, error = %message, "API handler response was not an object");
                Err(ActionDispatchError::Decode {
                    url: url.to_string(),
                    message,
                })
            }
        }
    }

    async fn call_custom(
        &self,
        function: &str,
        prepared: &PreparedAction,
    ) -> Result<ActionOutcome, ActionDispatchError> {
        let Some(handler) = self.custom.get(function) else {
            tracing::debug!(function, "No custom handler registered, ignoring action");
            return Ok(ActionOutcome::NoOp);
        };

        let call = CustomCall {
            component_id: prepared.component_id.clone(),
            action_id: prepared.action.id.clone(),
            state: prepared.state.clone(),
            payload: prepared.payload.clone(),
        };
        handler
            .call(call)
            .await
            .map(ActionOutcome::Patch)
            .map_err(|message| ActionDispatchError::Custom {
                function: function.to_string(),
                message,
            })
    }
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("transport", &self.transport.is_some())
            .field("custom", &self.custom)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use tessera_types::Handler;

    /// Transport that records calls and replays a canned result.
    struct Recorder {
        calls: Mutex<Vec<(String, String, Value)>>,
        result: Result<StatePatch, TransportError>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn invoke(&self, method: &str, url: &str, body: &Value) -> Result<StatePatch, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), url.to_string(), body.clone()));
            self.result.clone()
        }
    }

    fn prepared(action: Action, state: State) -> PreparedAction {
        PreparedAction {
            component_id: "c".to_string(),
            action,
            state,
            committed: None,
            payload: None,
        }
    }

    #[tokio::test]
    async fn test_api_handler_defaults_to_post_and_sends_state() {
        let mut patch = StatePatch::new();
        patch.insert("status".to_string(), json!("queued"));
        let recorder = Arc::new(Recorder {
            calls: Default::default(),
            result: Ok(patch.clone()),
        });
        let dispatcher = ActionDispatcher::new().with_transport(recorder.clone());

        let mut handler = Handler::api("POST", "/process");
        handler.config.method = None;
        let state = State::from_value(json!({ "file": "a.pdf" }));
        let outcome = dispatcher
            .execute(&prepared(Action::new("process", "Process", handler), state))
            .await
            .unwrap();

        assert_eq!(outcome, ActionOutcome::Patch(patch));
        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls[0], ("POST".to_string(), "/process".to_string(), json!({ "file": "a.pdf" })));
    }

    #[tokio::test]
    async fn test_transport_errors_are_classified() {
        let dispatcher = ActionDispatcher::new().with_transport(Arc::new(Recorder {
            calls: Default::default(),
            result: Err(TransportError::Decode("array".to_string())),
        }));
        let action = Action::new("a", "A", Handler::api("GET", "/x"));
        let err = dispatcher.execute(&prepared(action, State::new())).await.unwrap_err();
        assert!(err.is_decode());

        let action = Action::new("a", "A", Handler::api("GET", "/x"));
        let err = ActionDispatcher::new()
            .execute(&prepared(action, State::new()))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_state_handler_returns_update_verbatim() {
        let mut update = StatePatch::new();
        update.insert("step".to_string(), json!(2));
        let action = Action::new("next", "Next", Handler::state(update.clone()));
        let outcome = ActionDispatcher::new()
            .execute(&prepared(action, State::new()))
            .await
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Patch(update));
    }

    #[tokio::test]
    async fn test_navigation_handler_emits_intent() {
        let action = Action::new("docs", "Docs", Handler::navigation("/docs"));
        let outcome = ActionDispatcher::new()
            .execute(&prepared(action, State::new()))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Navigate(NavigationIntent {
                url: "/docs".to_string()
            })
        );
    }

    struct Retry;

    #[async_trait]
    impl CustomHandler for Retry {
        fn name(&self) -> &str {
            "retryProcess"
        }

        async fn call(&self, call: CustomCall) -> Result<StatePatch, String> {
            let file = call
                .payload
                .as_ref()
                .and_then(|p| p.get("filename"))
                .cloned()
                .ok_or("row required")?;
            let mut patch = StatePatch::new();
            patch.insert("retrying".to_string(), file);
            Ok(patch)
        }
    }

    #[tokio::test]
    async fn test_custom_handlers() {
        let mut registry = CustomHandlerRegistry::new();
        registry.register(Retry);
        let dispatcher = ActionDispatcher::new().with_custom_handlers(registry);

        let unregistered = Action::new("x", "X", Handler::custom("unknownFn"));
        let outcome = dispatcher.execute(&prepared(unregistered, State::new())).await.unwrap();
        assert_eq!(outcome, ActionOutcome::NoOp);

        let mut call = prepared(Action::new("retry", "Retry", Handler::custom("retryProcess")), State::new());
        call.payload = Some(json!({ "filename": "a.pdf" }));
        let outcome = dispatcher.execute(&call).await.unwrap();
        assert_eq!(outcome.patch().and_then(|p| p.get("retrying")), Some(&json!("a.pdf")));

        call.payload = None;
        let err = dispatcher.execute(&call).await.unwrap_err();
        assert!(matches!(err, ActionDispatchError::Custom { ref message, .. } if message == "row required"));
    }
}
