//! CLI command handlers.

pub mod config;
pub mod dispatch;
pub mod render;
pub mod tui;
pub mod validate;
pub mod workflow;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::Value;
use tessera_client::TesseraClient;
use tessera_config::{LoadedConfig, TesseraConfig};
use tessera_render::RenderSession;
use tessera_types::{Principal, State, UiConfig, ValidatedConfig, ValidationOptions};

/// Environment variable holding the bearer token for the application server.
const AUTH_TOKEN_ENV: &str = "TESSERA_AUTH_TOKEN";

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Application server URL (flag, env, then `[server] url`).
    pub server_url: String,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Merged config files.
    pub loaded: LoadedConfig,
}

impl Context {
    pub fn new(loaded: LoadedConfig, server: Option<String>, json_output: bool, verbose: bool) -> Self {
        let server_url = server.unwrap_or_else(|| loaded.config.server().url);
        Self {
            server_url,
            json_output,
            verbose,
            loaded,
        }
    }

    pub fn config(&self) -> &TesseraConfig {
        &self.loaded.config
    }

    /// Client for the application server.
    pub fn client(&self) -> Result<TesseraClient> {
        let server = self.config().server();
        let mut builder = TesseraClient::builder()
            .base_url(&self.server_url)
            .timeout(Duration::from_secs(server.timeout_secs));
        if let Some(token) = std::env::var(AUTH_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or(server.auth_token)
        {
            builder = builder.auth_token(token);
        }
        Ok(builder.build()?)
    }

    /// Client for the workflow engine.
    pub fn workflow_client(&self, url: Option<&str>) -> Result<TesseraClient> {
        let workflow = self.config().workflow();
        let server = self.config().server();
        let mut builder = TesseraClient::builder()
            .base_url(url.unwrap_or(&workflow.url))
            .timeout(Duration::from_secs(server.timeout_secs));
        if let Ok(token) = std::env::var(AUTH_TOKEN_ENV)
            && !token.is_empty()
        {
            builder = builder.auth_token(token);
        }
        Ok(builder.build()?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared arguments
// ─────────────────────────────────────────────────────────────────────────────

/// Arguments selecting a UI config, its state and the viewer.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Path to the UI config (JSON)
    pub config: PathBuf,

    /// JSON file with the initial state object
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Viewer user id; enables role gates
    #[arg(long)]
    pub user: Option<String>,

    /// Viewer role (repeatable)
    #[arg(long = "role", requires = "user")]
    pub roles: Vec<String>,

    /// Reject unsupported component types
    #[arg(long)]
    pub strict: bool,
}

impl SessionArgs {
    /// Parse and validate the config.
    pub fn load_config(&self, ctx: &Context) -> Result<ValidatedConfig> {
        let options = ValidationOptions {
            strict_components: self.strict || ctx.config().renderer().strict_components,
        };
        let config = UiConfig::from_path(&self.config)
            .with_context(|| format!("Failed to load {}", self.config.display()))?;
        Ok(config.validate(options)?)
    }

    /// Build a session from the config, state file and principal.
    pub fn session(&self, ctx: &Context) -> Result<RenderSession> {
        let config = self.load_config(ctx)?;
        let state = match &self.state {
            Some(path) => load_state(path)?,
            None => State::new(),
        };

        let mut session = RenderSession::new(config, state);
        if let Some(user) = &self.user {
            let principal = self
                .roles
                .iter()
                .fold(Principal::new(user), |p, role| p.with_role(role));
            session = session.with_principal(principal);
        }
        Ok(session)
    }
}

fn load_state(path: &Path) -> Result<State> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse state file {}", path.display()))?;
    if !value.is_object() {
        anyhow::bail!("State file {} must contain a JSON object", path.display());
    }
    Ok(State::from_value(value))
}

/// Parse `key=value`; the value is JSON when it parses as JSON, else a string.
pub fn parse_key_value(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
