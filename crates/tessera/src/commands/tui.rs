//! TUI command handler.

use anyhow::Result;
use clap::Args;
use tessera_tui::{LogBuffer, TuiConfig};

use super::{Context, SessionArgs};

/// TUI command arguments.
#[derive(Args, Debug)]
pub struct TuiArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Don't contact the server (actions with api handlers fail, bindings stay empty)
    #[arg(long)]
    pub offline: bool,
}

/// Run the TUI.
pub async fn run(args: TuiArgs, ctx: &Context, log_buffer: LogBuffer) -> Result<()> {
    let session = args.session.session(ctx)?;
    tracing::info!(config = %session.config().id(), server = %ctx.server_url, "Opening config");

    let mut config = TuiConfig::new(session).with_log_buffer(log_buffer);
    if !args.offline {
        config = config.with_client(ctx.client()?);
    }

    tessera_tui::run_with_config(config).await
}
