//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tessera_config::LayerStatus;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./tessera.toml) instead of user config
        #[arg(long)]
        local: bool,
    },

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Init { local } => cmd_init(local),
        ConfigCommand::Path => cmd_path(),
    }
}

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    sources: Vec<PathBuf>,
    server_url: &'a str,
    config: &'a tessera_config::TesseraConfig,
    warnings: &'a [String],
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;
    let config = &loaded.config;

    if ctx.json_output {
        let output = ShowOutput {
            sources: loaded.loaded_from().into_iter().map(PathBuf::from).collect(),
            server_url: &ctx.server_url,
            config,
            warnings: &loaded.warnings,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("# Tessera Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    let server = config.server();
    println!("Server:");
    println!("  url: {}", ctx.server_url);
    println!("  timeout: {}s", server.timeout_secs);
    println!(
        "  auth token: {}",
        if server.auth_token.is_some() { "set in config" } else { "not set" }
    );
    println!();

    let workflow = config.workflow();
    println!("Workflow:");
    println!("  url: {}", workflow.url);
    println!("  namespace: {}", workflow.namespace);
    println!(
        "  polling: every {}s, up to {} times",
        workflow.poll_interval_secs, workflow.max_polls
    );
    println!();

    println!("Renderer:");
    println!("  strict components: {}", config.renderer().strict_components);
    println!();

    let logging = config.logging();
    println!("Logging:");
    println!("  level: {}", logging.level);
    println!("  file: {}", logging.file);
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    if ctx.verbose {
        println!("---\nRaw config:\n");
        if let Ok(toml_str) = config.to_toml() {
            println!("{}", toml_str);
        }
    }

    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;

    println!("Config file search order (later overrides earlier):\n");
    for layer in &loaded.layers {
        let status = match &layer.status {
            LayerStatus::Loaded => "✓ loaded   ",
            LayerStatus::Missing => "· not found",
            LayerStatus::Invalid(_) => "✗ invalid  ",
        };
        println!("  {} {} ({})", status, layer.path.display(), layer.kind.label());
    }

    println!();
    let loaded_count = loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found. Run 'tessera config init' to create one.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }

    Ok(())
}

const CONFIG_TEMPLATE: &str = r#"# Tessera Configuration

# Application serving action handlers and data bindings
[server]
url = "http://localhost:3000"
timeout_secs = 30
# Prefer the TESSERA_AUTH_TOKEN environment variable
# auth_token = ""

# Workflow engine used by `tessera workflow`
[workflow]
url = "http://localhost:8080"
namespace = "tessera"
poll_interval_secs = 5
max_polls = 120

[renderer]
# Reject component types no widget handles
strict_components = false

[logging]
level = "info"
# Daily JSON logs under the config directory
file = true
"#;

fn cmd_init(local: bool) -> Result<()> {
    let path = if local {
        PathBuf::from(tessera_config::PROJECT_CONFIG_FILE)
    } else {
        tessera_config::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
    };

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, CONFIG_TEMPLATE)?;
    println!("✓ Created {}", path.display());
    Ok(())
}

fn cmd_path() -> Result<()> {
    match tessera_config::user_config_path() {
        Some(path) => println!("{}", path.display()),
        None => println!("Could not determine config directory"),
    }
    Ok(())
}
