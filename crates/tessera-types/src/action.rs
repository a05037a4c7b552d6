//! User-triggerable actions and their handlers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How an action is presented and whether it commits pending input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[default]
    Button,
    Link,
    /// Commits the component's local input into state before the handler runs.
    Submit,
    Custom,
}

/// Visual emphasis hint for the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStyle {
    #[default]
    Primary,
    Secondary,
    Destructive,
    Ghost,
}

/// A user-triggerable operation bound to a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ActionKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ActionStyle>,
    pub handler: Handler,
}

impl Action {
    pub fn new(id: impl Into<String>, label: impl Into<String>, handler: Handler) -> Self {
        Self {
            id: id.into(),
            kind: ActionKind::Button,
            label: label.into(),
            style: None,
            handler,
        }
    }

    /// Set the action kind.
    pub fn with_kind(mut self, kind: ActionKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Which executor runs the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    Api,
    Navigation,
    State,
    Custom,
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerKind::Api => "api",
            HandlerKind::Navigation => "navigation",
            HandlerKind::State => "state",
            HandlerKind::Custom => "custom",
        };
        f.write_str(s)
    }
}

/// The executable behaviour behind an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handler {
    #[serde(rename = "type")]
    pub kind: HandlerKind,
    #[serde(default)]
    pub config: HandlerConfig,
}

impl Handler {
    /// Remote call handler.
    pub fn api(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: HandlerKind::Api,
            config: HandlerConfig {
                method: Some(method.into()),
                url: Some(url.into()),
                ..Default::default()
            },
        }
    }

    /// Local state patch handler.
    pub fn state(update: Map<String, Value>) -> Self {
        Self {
            kind: HandlerKind::State,
            config: HandlerConfig {
                state_update: Some(update),
                ..Default::default()
            },
        }
    }

    /// Route change handler.
    pub fn navigation(url: impl Into<String>) -> Self {
        Self {
            kind: HandlerKind::Navigation,
            config: HandlerConfig {
                url: Some(url.into()),
                ..Default::default()
            },
        }
    }

    /// Host-registered handler looked up by name.
    pub fn custom(function: impl Into<String>) -> Self {
        Self {
            kind: HandlerKind::Custom,
            config: HandlerConfig {
                custom_function: Some(function.into()),
                ..Default::default()
            },
        }
    }
}

/// Handler parameters; which fields apply depends on [`HandlerKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_update: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_function: Option<String>,
}
