//! Workflow command - start and inspect workflow engine executions.

use std::time::Duration;

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use serde_json::{Map, Value};
use tessera_client::{Execution, ExecutionState};

use super::{Context, parse_key_value};

/// Arguments for the workflow command.
#[derive(Args, Debug)]
pub struct WorkflowArgs {
    /// Workflow engine URL (default: `[workflow] url`)
    #[arg(long, global = true, env = "TESSERA_WORKFLOW_URL")]
    pub engine: Option<String>,

    #[command(subcommand)]
    pub command: WorkflowCommand,
}

#[derive(Subcommand, Debug)]
pub enum WorkflowCommand {
    /// Start an execution of a flow
    Run {
        /// Flow id
        flow: String,

        /// Namespace (default: `[workflow] namespace`)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Flow input as key=value (repeatable)
        #[arg(long = "input", value_parser = parse_key_value)]
        inputs: Vec<(String, Value)>,

        /// Poll until the execution reaches a terminal state
        #[arg(long)]
        wait: bool,
    },

    /// Show an execution
    Status {
        /// Execution id
        id: String,
    },
}

/// Run the workflow command.
pub async fn run(args: WorkflowArgs, ctx: &Context) -> Result<()> {
    let workflows = ctx.workflow_client(args.engine.as_deref())?.workflows();
    let settings = ctx.config().workflow();

    let execution = match args.command {
        WorkflowCommand::Run {
            flow,
            namespace,
            inputs,
            wait,
        } => {
            let namespace = namespace.unwrap_or(settings.namespace);
            let inputs: Map<String, Value> = inputs.into_iter().collect();
            let started = workflows.execute(&namespace, &flow, inputs).await?;
            if wait && !started.state.is_terminal() {
                workflows
                    .wait(
                        &started.id,
                        Duration::from_secs(settings.poll_interval_secs),
                        settings.max_polls,
                    )
                    .await?
            } else {
                started
            }
        }
        WorkflowCommand::Status { id } => workflows.get(&id).await?,
    };

    print_execution(&execution, ctx)?;

    if execution.state.is_terminal() && !execution.state.is_success() {
        anyhow::bail!("Execution {} ended in state {}", execution.id, execution.state);
    }
    Ok(())
}

fn print_execution(execution: &Execution, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(execution)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let state_style = match &execution.state {
        s if s.is_success() => Style::new().green(),
        s if s.is_terminal() => Style::new().red(),
        ExecutionState::Paused => Style::new().yellow(),
        _ => Style::new().cyan(),
    };

    println!();
    println!("{}", style(format!("Execution {}", execution.id)).bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    if let (Some(namespace), Some(flow)) = (&execution.namespace, &execution.flow_id) {
        println!("  {} {}/{}", dim.apply_to("Flow:"), namespace, flow);
    }
    println!(
        "  {} {}",
        dim.apply_to("State:"),
        state_style.apply_to(format!("● {}", execution.state))
    );
    if !execution.outputs.is_empty() {
        println!("  {}", dim.apply_to("Outputs:"));
        for (key, value) in &execution.outputs {
            println!("    {} = {}", key, value);
        }
    }
    println!();
    Ok(())
}
