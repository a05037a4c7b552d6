//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::api::{ActionsApi, DataApi, WorkflowsApi};
use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tessera HTTP client.
///
/// One client talks to one base URL: the hosting application's server for
/// action handlers and data bindings, or the workflow engine.
///
/// # Example
///
/// ```no_run
/// use tessera_client::TesseraClient;
///
/// # async fn example() -> tessera_client::Result<()> {
/// let client = TesseraClient::builder()
///     .base_url("http://localhost:3000")
///     .build()?;
///
/// let patch = client
///     .actions()
///     .invoke("POST", "/api/automations/pdf-processor/process", &serde_json::json!({}))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TesseraClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for requests.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl TesseraClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the action handler API.
    pub fn actions(&self) -> ActionsApi {
        ActionsApi::new(self.clone())
    }

    /// Access the data binding API.
    pub fn data(&self) -> DataApi {
        DataApi::new(self.clone())
    }

    /// Access the workflow engine API.
    pub fn workflows(&self) -> WorkflowsApi {
        WorkflowsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL under the versioned API prefix.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("api/v1/{}", path))
            .map_err(Error::from)
    }

    /// Build an API URL ending in `segment`, percent-encoded so ids
    /// containing `/`, `?` or `#` stay a single path segment.
    pub(crate) fn api_url_with_segment(&self, path: &str, segment: &str) -> Result<Url> {
        let mut url = self.api_url(path)?;
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("base URL cannot take a path: {}", self.inner.base_url)))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Resolve a config-authored target: absolute URLs are used as-is,
    /// anything else is joined onto the base URL.
    pub(crate) fn resolve(&self, target: &str) -> Result<Url> {
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .inner
                .base_url
                .join(target.trim_start_matches('/'))
                .map_err(Error::from),
            Err(e) => Err(e.into()),
        }
    }

    /// Send a request and return the raw response body of a successful call.
    ///
    /// `GET` and `HEAD` requests never carry a body.
    pub(crate) async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Vec<u8>> {
        tracing::debug!(%method, %url, "sending request");

        let mut request = self
            .inner
            .http
            .request(method.clone(), url)
            .timeout(self.inner.timeout);
        if let Some(body) = body
            && method != Method::GET
            && method != Method::HEAD
        {
            request = request.json(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Make a GET request and decode the JSON body.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let bytes = self.send(Method::GET, url, None).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Make a POST request and decode the JSON body.
    pub(crate) async fn post<T, B>(&self, url: Url, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let bytes = self.send(Method::POST, url, Some(&body)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(err) => Error::Api {
                status,
                code: err.code.unwrap_or_else(|| "unknown".to_string()),
                message: err.message.unwrap_or_else(|| format!("HTTP {}", status)),
            },
            Err(_) => Error::Api {
                status,
                code: "unknown".to_string(),
                message: format!("HTTP {}", status),
            },
        }
    }
}

/// Builder for creating a TesseraClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_token: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the authentication token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<TesseraClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::Config("Invalid auth token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("tessera-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(TesseraClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
