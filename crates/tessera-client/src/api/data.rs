//! Data binding API.

use serde_json::Value;

use crate::client::TesseraClient;
use crate::error::Result;

/// Fetches values for `api` data bindings on behalf of the hosting page.
pub struct DataApi {
    client: TesseraClient,
}

impl DataApi {
    pub(crate) fn new(client: TesseraClient) -> Self {
        Self { client }
    }

    /// GET an endpoint and return its JSON body.
    pub async fn fetch(&self, endpoint: &str) -> Result<Value> {
        let url = self.client.resolve(endpoint)?;
        self.client.get(url).await
    }
}
