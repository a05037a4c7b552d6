//! Workflow engine API.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::client::TesseraClient;
use crate::error::{Error, Result};
use crate::types::{ExecuteRequest, Execution};

/// Workflow engine client: start flow executions and poll their status.
pub struct WorkflowsApi {
    client: TesseraClient,
}

impl WorkflowsApi {
    pub(crate) fn new(client: TesseraClient) -> Self {
        Self { client }
    }

    /// Start an execution of `namespace/flow_id` with the given inputs.
    pub async fn execute(
        &self,
        namespace: &str,
        flow_id: &str,
        inputs: Map<String, Value>,
    ) -> Result<Execution> {
        let request = ExecuteRequest {
            namespace: namespace.to_string(),
            flow_id: flow_id.to_string(),
            inputs,
        };
        let url = self.client.api_url("executions")?;
        let execution: Execution = self.client.post(url, &request).await?;
        tracing::info!(execution_id = %execution.id, namespace, flow_id, "workflow execution started");
        Ok(execution)
    }

    /// Get an execution by ID.
    pub async fn get(&self, id: &str) -> Result<Execution> {
        let url = self.client.api_url_with_segment("executions", id)?;
        self.client.get(url).await
    }

    /// Poll an execution until it reaches a terminal state.
    ///
    /// Gives up with [`Error::Timeout`] after `max_polls` non-terminal reads.
    pub async fn wait(&self, id: &str, interval: Duration, max_polls: u32) -> Result<Execution> {
        for attempt in 1..=max_polls {
            let execution = self.get(id).await?;
            tracing::debug!(execution_id = id, attempt, state = %execution.state, "polled execution");
            if execution.state.is_terminal() {
                return Ok(execution);
            }
            if attempt < max_polls {
                tokio::time::sleep(interval).await;
            }
        }
        Err(Error::Timeout(id.to_string()))
    }
}
