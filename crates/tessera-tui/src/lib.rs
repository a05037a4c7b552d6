//! Tessera TUI - terminal host for UI configs.
//!
//! Draws a [`RenderSession`] with ratatui, routes keys to local input and
//! actions, runs actions in the background and refreshes `api` bindings on
//! their interval.
//!
//! The caller owns tracing setup. To see logs inside the TUI, install a
//! [`TuiLogLayer`] over the same [`LogBuffer`] passed in [`TuiConfig`].

pub mod app;
pub mod logs;
pub mod ui;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::{self, Stdout};
use std::panic;
use tessera_client::TesseraClient;
use tessera_render::{ActionDispatcher, RenderSession};

pub use app::App;
pub use logs::{LogBuffer, LogEntry, TuiLogLayer};

/// Terminal type alias for convenience.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode.
pub fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Install a panic hook that restores the terminal before panicking.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));
}

/// Everything the TUI needs to host one config.
pub struct TuiConfig {
    /// The mounted config with its initial state and principal.
    pub session: RenderSession,
    /// Executes actions; give it a transport for `api` handlers.
    pub dispatcher: ActionDispatcher,
    /// Client for `api` data bindings. Bindings are not fetched without one.
    pub client: Option<TesseraClient>,
    /// Buffer shown in the logs panel.
    pub log_buffer: LogBuffer,
}

impl TuiConfig {
    /// Host a session with no transport and no data client.
    pub fn new(session: RenderSession) -> Self {
        Self {
            session,
            dispatcher: ActionDispatcher::new(),
            client: None,
            log_buffer: LogBuffer::new(),
        }
    }

    /// Use `client` both for `api` action handlers and for data bindings.
    pub fn with_client(mut self, client: TesseraClient) -> Self {
        self.dispatcher = self.dispatcher.with_transport(std::sync::Arc::new(client.clone()));
        self.client = Some(client);
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: ActionDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_log_buffer(mut self, log_buffer: LogBuffer) -> Self {
        self.log_buffer = log_buffer;
        self
    }
}

/// Run the TUI until the user quits, restoring the terminal afterwards.
pub async fn run_with_config(config: TuiConfig) -> Result<()> {
    install_panic_hook();

    let mut terminal = init_terminal()?;
    let mut app = App::new(config.session, config.dispatcher, config.client, config.log_buffer);

    let result = app.run(&mut terminal).await;

    restore_terminal(&mut terminal)?;

    result
}
