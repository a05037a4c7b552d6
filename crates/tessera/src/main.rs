//! Tessera - declarative automation UI renderer
//!
//! Main entry point for the Tessera CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Subscriber;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::prelude::*;

mod commands;

use commands::{config, dispatch, render, tui, validate, workflow};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Tessera - render and drive declarative automation UIs
#[derive(Parser)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Application server URL for action handlers and data bindings
    #[arg(long, global = true, env = "TESSERA_SERVER_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a UI config for structural errors
    Validate(validate::ValidateArgs),

    /// Render a UI config against a state file
    Render(render::RenderArgs),

    /// Run one component action and print the resulting state
    Dispatch(dispatch::DispatchArgs),

    /// Open a UI config in the terminal
    Tui(tui::TuiArgs),

    /// Start and inspect workflow executions
    Workflow(workflow::WorkflowArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

/// Crates whose events the console and file layers show.
const LOG_TARGETS: &[&str] = &[
    "tessera",
    "tessera_render",
    "tessera_client",
    "tessera_config",
    "tessera_tui",
];

fn filter_for(level: &str, fallback: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS.iter().map(|t| format!("{}={}", t, level)).collect();
    directives.push(fallback.to_string());
    directives.join(",")
}

/// JSON lines at trace level for the daily log file.
fn json_file_layer<S>(writer: Option<NonBlocking>) -> Option<impl Layer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(w)
            .with_filter(EnvFilter::new(filter_for("trace", "info")))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = tessera_config::load_config(None);
    let logging = loaded.config.logging();

    // Console filter: RUST_LOG wins, then --verbose, then [logging] level
    let console_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = if cli.verbose { "debug" } else { logging.level.as_str() };
            EnvFilter::new(filter_for(level, "warn"))
        })
    };

    // Rotating JSON file under the config dir
    let (file_writer, _guard) = if logging.file {
        let log_dir = tessera_config::user_config_dir()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| std::path::PathBuf::from("logs"));
        let file_appender = tracing_appender::rolling::daily(&log_dir, "tessera.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        (Some(non_blocking), Some(guard))
    } else {
        (None, None)
    };

    // The TUI owns the terminal, so its logs go to the in-app panel
    let log_buffer = if matches!(cli.command, Commands::Tui(_)) {
        let buffer = tessera_tui::LogBuffer::new();
        tracing_subscriber::registry()
            .with(
                tessera_tui::TuiLogLayer::new(buffer.clone())
                    .with_min_level(tracing::Level::TRACE)
                    .with_filter(console_filter()),
            )
            .with(json_file_layer(file_writer.clone()))
            .init();
        Some(buffer)
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .with_filter(console_filter()),
            )
            .with(json_file_layer(file_writer))
            .init();
        None
    };

    let ctx = commands::Context::new(loaded, cli.server, cli.json, cli.verbose);

    // Dispatch to command handlers
    match cli.command {
        Commands::Validate(args) => validate::run(args, &ctx).await,
        Commands::Render(args) => render::run(args, &ctx).await,
        Commands::Dispatch(args) => dispatch::run(args, &ctx).await,
        Commands::Tui(args) => tui::run(args, &ctx, log_buffer.unwrap_or_default()).await,
        Commands::Workflow(args) => workflow::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
