//! Request and response types for the workflow engine API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Request to start a flow execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub namespace: String,
    pub flow_id: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub inputs: Map<String, Value>,
}

/// Lifecycle state of a flow execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ExecutionState {
    Created,
    Running,
    Paused,
    Restarted,
    Killing,
    Success,
    Warning,
    Failed,
    Killed,
    /// Legacy terminal state reported by older engine proxies.
    Completed,
    Other(String),
}

impl ExecutionState {
    /// Whether the execution will not change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionState::Success
                | ExecutionState::Warning
                | ExecutionState::Failed
                | ExecutionState::Killed
                | ExecutionState::Completed
        )
    }

    /// Whether the execution ended without failing.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ExecutionState::Success | ExecutionState::Warning | ExecutionState::Completed
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExecutionState::Created => "CREATED",
            ExecutionState::Running => "RUNNING",
            ExecutionState::Paused => "PAUSED",
            ExecutionState::Restarted => "RESTARTED",
            ExecutionState::Killing => "KILLING",
            ExecutionState::Success => "SUCCESS",
            ExecutionState::Warning => "WARNING",
            ExecutionState::Failed => "FAILED",
            ExecutionState::Killed => "KILLED",
            ExecutionState::Completed => "COMPLETED",
            ExecutionState::Other(s) => s,
        }
    }
}

impl From<String> for ExecutionState {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "CREATED" => ExecutionState::Created,
            "RUNNING" => ExecutionState::Running,
            "PAUSED" => ExecutionState::Paused,
            "RESTARTED" => ExecutionState::Restarted,
            "KILLING" => ExecutionState::Killing,
            "SUCCESS" => ExecutionState::Success,
            "WARNING" => ExecutionState::Warning,
            "FAILED" => ExecutionState::Failed,
            "KILLED" => ExecutionState::Killed,
            "COMPLETED" => ExecutionState::Completed,
            _ => ExecutionState::Other(s),
        }
    }
}

impl From<ExecutionState> for String {
    fn from(state: ExecutionState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engines report state either as a bare string or as `{ "current": ... }`.
impl<'de> Deserialize<'de> for ExecutionState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Plain(String),
            Detailed { current: String },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Plain(s) | Repr::Detailed { current: s } => s.into(),
        })
    }
}

/// A flow execution as reported by the workflow engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
    #[serde(default = "default_state")]
    pub state: ExecutionState,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub outputs: Map<String, Value>,
}

fn default_state() -> ExecutionState {
    ExecutionState::Created
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_accepts_plain_and_detailed_forms() {
        let plain: Execution = serde_json::from_value(json!({ "id": "e1", "state": "RUNNING" })).unwrap();
        assert_eq!(plain.state, ExecutionState::Running);

        let detailed: Execution = serde_json::from_value(json!({
            "id": "e2",
            "flowId": "pdf-processor",
            "state": { "current": "SUCCESS", "histories": [] }
        }))
        .unwrap();
        assert_eq!(detailed.state, ExecutionState::Success);
        assert_eq!(detailed.flow_id.as_deref(), Some("pdf-processor"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(ExecutionState::Failed.is_terminal());
        assert!(!ExecutionState::Failed.is_success());
        assert!(ExecutionState::Completed.is_success());
        assert!(!ExecutionState::Running.is_terminal());
        assert!(!ExecutionState::Other("QUEUED".to_string()).is_terminal());
    }

    #[test]
    fn test_state_defaults_to_created() {
        let execution: Execution = serde_json::from_value(json!({ "id": "e3" })).unwrap();
        assert_eq!(execution.state, ExecutionState::Created);
    }

    #[test]
    fn test_execute_request_uses_camel_case() {
        let request = ExecuteRequest {
            namespace: "tessera".to_string(),
            flow_id: "pdf".to_string(),
            inputs: Map::new(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "namespace": "tessera", "flowId": "pdf" })
        );
    }
}
