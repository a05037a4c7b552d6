//! The session-scoped state bag and the principal viewing it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level keys to overwrite in [`State`].
pub type StatePatch = Map<String, Value>;

/// String-keyed data bag owned by one rendering session.
///
/// Merges are shallow: each top-level key of a patch replaces the existing
/// value wholesale, nested objects included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Map<String, Value>);

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from a JSON value; non-objects yield an empty state.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Shallow-merge a patch, returning the keys whose value changed.
    pub fn merge(&mut self, patch: StatePatch) -> Vec<String> {
        let mut changed = Vec::new();
        for (key, value) in patch {
            if self.0.get(&key) != Some(&value) {
                changed.push(key.clone());
            }
            self.0.insert(key, value);
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// The state as a JSON object, suitable for a request body.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// An owned copy of the current contents.
    pub fn snapshot(&self) -> State {
        self.clone()
    }
}

impl From<Map<String, Value>> for State {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The authenticated viewer, as supplied by the identity provider.
///
/// The user id is opaque; the renderer never handles credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Whether the principal holds at least one of `allowed`.
    pub fn has_any_role(&self, allowed: &[String]) -> bool {
        allowed.iter().any(|role| self.roles.contains(role))
    }
}
