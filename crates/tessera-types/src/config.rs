//! The top-level UI configuration and its load-time validation.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::{Action, HandlerKind};
use crate::component::{Component, DataSource};
use crate::error::{ConfigError, Result};
use crate::options::ComponentOptions;

/// Container arrangement for a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Single,
    Split,
    Tabs,
    Dashboard,
}

impl std::fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LayoutKind::Single => "single",
            LayoutKind::Split => "split",
            LayoutKind::Tabs => "tabs",
            LayoutKind::Dashboard => "dashboard",
        };
        f.write_str(s)
    }
}

/// Layout type plus components in render order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(rename = "type")]
    pub kind: LayoutKind,
    #[serde(default)]
    pub components: Vec<Component>,
}

/// Host colour overrides (`#RRGGBB`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
    #[serde(default)]
    pub accent: Option<String>,
}

/// A declarative UI configuration, authored outside the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    pub id: String,
    #[serde(default)]
    pub version: String,
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

/// Strictness knobs for [`UiConfig::validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Reject component types outside the closed set instead of tolerating them.
    pub strict_components: bool,
}

impl ValidationOptions {
    pub fn strict() -> Self {
        Self {
            strict_components: true,
        }
    }
}

impl UiConfig {
    /// Parse a config document without validating it.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a config file without validating it.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Look up a component by id.
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.layout.components.iter().find(|c| c.id == id)
    }

    /// Check structural invariants and type every component's options.
    pub fn validate(self, options: ValidationOptions) -> Result<ValidatedConfig> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::missing("id", "UI config"));
        }

        let mut typed = HashMap::new();
        {
            let mut seen = HashSet::new();

            for (index, component) in self.layout.components.iter().enumerate() {
                if component.id.trim().is_empty() {
                    return Err(ConfigError::missing("id", format!("component #{}", index)));
                }
                if !seen.insert(component.id.as_str()) {
                    return Err(ConfigError::DuplicateComponentId(component.id.clone()));
                }
                if options.strict_components && component.kind.is_unknown() {
                    return Err(ConfigError::UnknownComponentType {
                        component: component.id.clone(),
                        kind: component.kind.to_string(),
                    });
                }

                validate_binding(component)?;

                let parsed = ComponentOptions::parse(&component.id, &component.kind, &component.config)?;
                validate_actions(component, component.actions.iter().chain(parsed.embedded_actions()))?;
                typed.insert(component.id.clone(), parsed);
            }
        }

        Ok(ValidatedConfig {
            config: self,
            options: typed,
        })
    }
}

fn validate_binding(component: &Component) -> Result<()> {
    let Some(binding) = &component.data else {
        return Ok(());
    };
    let context = format!("data binding of component '{}'", component.id);
    match binding.source {
        DataSource::State if binding.state_key.as_deref().is_none_or(str::is_empty) => {
            Err(ConfigError::missing("stateKey", context))
        }
        DataSource::Api if binding.endpoint.as_deref().is_none_or(str::is_empty) => {
            Err(ConfigError::missing("endpoint", context))
        }
        _ => Ok(()),
    }
}

fn validate_actions<'a>(
    component: &Component,
    actions: impl Iterator<Item = &'a Action>,
) -> Result<()> {
    let mut ids = HashSet::new();
    for action in actions {
        if !ids.insert(action.id.as_str()) {
            return Err(ConfigError::DuplicateActionId {
                component: component.id.clone(),
                action: action.id.clone(),
            });
        }
        let needs_url = matches!(action.handler.kind, HandlerKind::Api | HandlerKind::Navigation);
        if needs_url && action.handler.config.url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::missing(
                "handler.config.url",
                format!("action '{}' of component '{}'", action.id, component.id),
            ));
        }
    }
    Ok(())
}

/// A config that passed validation, with typed options per component.
///
/// Immutable for the lifetime of a rendering session.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    config: UiConfig,
    options: HashMap<String, ComponentOptions>,
}

impl ValidatedConfig {
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn layout(&self) -> &Layout {
        &self.config.layout
    }

    pub fn components(&self) -> &[Component] {
        &self.config.layout.components
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.config.component(id)
    }

    /// Typed options for a component.
    pub fn options(&self, component_id: &str) -> Option<&ComponentOptions> {
        self.options.get(component_id)
    }

    /// Every action a component exposes: declared ones first, then those
    /// embedded in its options.
    pub fn actions(&self, component_id: &str) -> Vec<&Action> {
        let declared = self
            .component(component_id)
            .map(|c| c.actions.as_slice())
            .unwrap_or_default();
        let embedded = self
            .options(component_id)
            .map(ComponentOptions::embedded_actions)
            .unwrap_or_default();
        declared.iter().chain(embedded).collect()
    }

    /// Look up one action of a component.
    pub fn action(&self, component_id: &str, action_id: &str) -> Option<&Action> {
        self.actions(component_id)
            .into_iter()
            .find(|a| a.id == action_id)
    }
}
