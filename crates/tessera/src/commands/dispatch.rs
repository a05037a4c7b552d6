//! Dispatch command - run one component action against the server.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use console::Style;
use serde::Serialize;
use serde_json::Value;
use tessera_render::{ActionDispatcher, ActionOutcome};

use super::{Context, SessionArgs, parse_key_value};

/// Arguments for the dispatch command.
#[derive(Args, Debug)]
pub struct DispatchArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Component owning the action
    #[arg(long)]
    pub component: String,

    /// Action id
    #[arg(long)]
    pub action: String,

    /// Local input for the component as field=value (repeatable)
    #[arg(long = "input", value_parser = parse_key_value)]
    pub inputs: Vec<(String, Value)>,
}

#[derive(Debug, Serialize)]
struct DispatchOutput<'a> {
    outcome: &'a ActionOutcome,
    changed: Vec<String>,
    state: Value,
}

/// Run the dispatch command.
pub async fn run(args: DispatchArgs, ctx: &Context) -> Result<()> {
    let mut session = args.session.session(ctx)?;
    for (field, value) in args.inputs {
        session.set_local_input(&args.component, field, value)?;
    }

    let before = session.state().clone();
    let dispatcher = ActionDispatcher::new().with_transport(Arc::new(ctx.client()?));
    let outcome = session
        .dispatch(&dispatcher, &args.component, &args.action)
        .await?;

    let changed: Vec<String> = session
        .state()
        .as_map()
        .iter()
        .filter(|(k, v)| before.get(k) != Some(*v))
        .map(|(k, _)| k.clone())
        .collect();

    if ctx.json_output {
        let output = DispatchOutput {
            outcome: &outcome,
            changed,
            state: session.state().to_value(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let green = Style::new().green();
    let dim = Style::new().dim();
    match &outcome {
        ActionOutcome::Patch(_) => println!("{} {}", green.apply_to("✓"), args.action),
        ActionOutcome::Navigate(intent) => {
            println!("{} {} → {}", green.apply_to("✓"), args.action, intent.url)
        }
        ActionOutcome::NoOp => println!("{} {} (no-op)", dim.apply_to("·"), args.action),
    }
    if changed.is_empty() {
        println!("  {}", dim.apply_to("state unchanged"));
    } else {
        for key in &changed {
            let value = session.state().get(key).cloned().unwrap_or_default();
            println!("  {} {} = {}", dim.apply_to("·"), key, value);
        }
    }
    Ok(())
}
