//! Data binding resolution and refresh targets.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tessera_types::{Component, DataSource, State, StatePatch};

/// The state key an `api` binding is written to: its `stateKey`, or the
/// component id when none is declared.
pub fn api_state_key(component: &Component) -> Option<&str> {
    let binding = component.data.as_ref()?;
    if binding.source != DataSource::Api {
        return None;
    }
    Some(binding.state_key.as_deref().unwrap_or(&component.id))
}

/// Resolve a component's bound data against the current state.
pub fn resolve_binding<'a>(component: &'a Component, state: &'a State) -> Option<&'a Value> {
    let binding = component.data.as_ref()?;
    match binding.source {
        DataSource::Static => binding.value.as_ref(),
        DataSource::State => state.get(binding.state_key.as_deref()?),
        DataSource::Api => state.get(api_state_key(component)?),
    }
}

/// An `api` binding the host should fetch and write back into state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTarget {
    pub component_id: String,
    pub endpoint: String,
    pub state_key: String,
    /// Re-fetch period; `None` means fetch once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<Duration>,
}

impl RefreshTarget {
    /// Build the target for a component, if it has an `api` binding.
    pub fn for_component(component: &Component) -> Option<Self> {
        let binding = component.data.as_ref()?;
        let endpoint = binding.endpoint.clone()?;
        Some(Self {
            component_id: component.id.clone(),
            endpoint,
            state_key: api_state_key(component)?.to_string(),
            interval: binding
                .refresh_interval
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
        })
    }

    /// The patch writing a fetched value to this target's key.
    pub fn patch(&self, value: Value) -> StatePatch {
        let mut patch = StatePatch::new();
        patch.insert(self.state_key.clone(), value);
        patch
    }
}
