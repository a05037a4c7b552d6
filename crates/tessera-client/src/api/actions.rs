//! Action handler API.

use reqwest::Method;
use serde_json::{Map, Value};

use crate::client::TesseraClient;
use crate::error::{Error, Result};

/// Executes `api`-type action handlers.
pub struct ActionsApi {
    client: TesseraClient,
}

impl ActionsApi {
    pub(crate) fn new(client: TesseraClient) -> Self {
        Self { client }
    }

    /// Call `method target` with `body` as JSON and return the response
    /// object as a state patch.
    ///
    /// An empty response body yields an empty patch. Any other body must be a
    /// JSON object.
    pub async fn invoke(&self, method: &str, target: &str, body: &Value) -> Result<Map<String, Value>> {
        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::Config(format!("invalid HTTP method '{}'", method)))?;
        let url = self.client.resolve(target)?;

        let bytes = self.client.send(method, url, Some(body)).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(patch) => Ok(patch),
            other => Err(Error::Decode(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
