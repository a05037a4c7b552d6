//! Configuration types for Tessera.
//!
//! All types support serde deserialization from TOML. Every section is
//! optional; a missing section falls back to its defaults when read through
//! the accessor methods on [`TesseraConfig`].

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// ```toml
/// [server]
/// url = "http://localhost:3000"
///
/// [workflow]
/// url = "http://localhost:8080"
/// namespace = "automations"
///
/// [renderer]
/// strict_components = true
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseraConfig {
    /// Hosting application that serves action handlers and data bindings.
    pub server: Option<ServerConfig>,
    /// Workflow engine connection and polling.
    pub workflow: Option<WorkflowConfig>,
    /// UI config validation behaviour.
    pub renderer: Option<RendererConfig>,
    /// Log level and file output.
    pub logging: Option<LoggingConfig>,
}

impl TesseraConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections present in `other` replace the corresponding section here.
    pub fn merge(&mut self, other: TesseraConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.workflow.is_some() {
            self.workflow = other.workflow;
        }

        if other.renderer.is_some() {
            self.renderer = other.renderer;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// The `[server]` section, or its defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// The `[workflow]` section, or its defaults.
    pub fn workflow(&self) -> WorkflowConfig {
        self.workflow.clone().unwrap_or_default()
    }

    /// The `[renderer]` section, or its defaults.
    pub fn renderer(&self) -> RendererConfig {
        self.renderer.clone().unwrap_or_default()
    }

    /// The `[logging]` section, or its defaults.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default base URL of the hosting application.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Connection settings for the application serving action handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL that relative handler and binding URLs resolve against.
    pub url: String,
    /// Bearer token sent with every request.
    ///
    /// Prefer `TESSERA_AUTH_TOKEN` over storing the token here.
    pub auth_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Whether the config file carries the auth token in plaintext.
    pub fn has_plaintext_auth_token(&self) -> bool {
        self.auth_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflow Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Workflow engine settings used by `tessera workflow`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Base URL of the workflow engine.
    pub url: String,
    /// Namespace flows are executed in unless overridden.
    pub namespace: String,
    /// Seconds between status polls when waiting on an execution.
    pub poll_interval_secs: u64,
    /// Polls before giving up on an execution.
    pub max_polls: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            namespace: "tessera".to_string(),
            poll_interval_secs: 5,
            max_polls: 120,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// UI config validation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Reject component types that no built-in widget handles.
    pub strict_components: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Write daily JSON log files under the config directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
