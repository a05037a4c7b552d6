//! Validate command - structural checks on a UI config.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use console::{Style, style};
use serde::Serialize;
use tessera_types::{UiConfig, ValidationOptions};

use super::Context;

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the UI config (JSON)
    pub config: PathBuf,

    /// Reject unsupported component types
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    valid: bool,
    id: String,
    version: String,
    layout: String,
    components: usize,
    actions: usize,
    unsupported: Vec<String>,
}

/// Run the validate command.
pub async fn run(args: ValidateArgs, ctx: &Context) -> Result<()> {
    let options = ValidationOptions {
        strict_components: args.strict || ctx.config().renderer().strict_components,
    };
    let config = UiConfig::from_path(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let validated = config.validate(options)?;

    let unsupported: Vec<String> = validated
        .components()
        .iter()
        .filter(|c| c.kind.is_unknown())
        .map(|c| format!("{} ({})", c.id, c.kind.as_str()))
        .collect();
    let actions = validated
        .components()
        .iter()
        .map(|c| validated.actions(&c.id).len())
        .sum();

    let output = ValidateOutput {
        valid: true,
        id: validated.id().to_string(),
        version: validated.config().version.clone(),
        layout: validated.layout().kind.to_string(),
        components: validated.components().len(),
        actions,
        unsupported,
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let green = Style::new().green();
    let dim = Style::new().dim();
    println!(
        "{} {} {}",
        green.apply_to("✓"),
        style(&output.id).bold(),
        dim.apply_to(format!("v{}", output.version))
    );
    println!(
        "  {} {} layout, {} components, {} actions",
        dim.apply_to("·"),
        output.layout,
        output.components,
        output.actions
    );
    for component in &output.unsupported {
        println!(
            "  {} unsupported component type, will not render: {}",
            Style::new().yellow().apply_to("⚠"),
            component
        );
    }
    Ok(())
}
