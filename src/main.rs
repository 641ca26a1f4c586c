//! # vpnwarden
//!
//! Terminal supervisor for a systemd-managed OpenVPN connection: start and
//! stop the unit, watch its status, and warn when the tunnel drops.
//!
//! ## Modules
//! - [`app`]: Application state and message handling.
//! - [`cli`]: Command-line argument parsing and one-shot commands.
//! - [`config`]: Settings storage.
//! - [`core`]: Command runner, service controller, state machine and poller.
//! - [`event`]: Event loop handling.
//! - [`ui`]: TUI rendering and widget definitions.

mod app;
mod cli;
mod config;
mod constants;
mod core;
mod event;
mod logger;
mod message;
mod state;
mod theme;
mod ui;
mod utils;

use app::App;
use clap::Parser;
use cli::args::Args;
use color_eyre::Result;
use event::{Event, EventHandler};

use crate::config::{SettingsStore, TomlSettingsStore};
use crate::core::poller::PollingScheduler;
use crate::core::CommandRunner;
use crate::message::Message;

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse arguments
    let args = Args::parse();

    let config_dir_source = if args.config_dir.is_some() {
        "from --config-dir or VPNWARDEN_CONFIG_DIR"
    } else {
        "default"
    };

    let config_dir = config::resolve_config_dir(args.config_dir.as_ref())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to resolve config directory: {e}"))?;

    let store = TomlSettingsStore::new(&config_dir);
    let settings = match store.load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!();
            eprintln!("Fix the file or remove it to use defaults:");
            eprintln!("  nano {}", store.location());
            eprintln!("  rm {}", store.location());
            std::process::exit(1);
        }
    };
    logger::configure(&settings.log_level, settings.max_log_entries);

    // Handle CLI commands (status, start, stop, ...)
    if let Some(command) = &args.command {
        logger::set_stderr_echo(true);
        if cli::commands::handle_command(command, &settings, &config_dir, config_dir_source)? {
            return Ok(());
        }
    }

    // Run the TUI application
    let terminal = ratatui::init();
    let result = run_tui(terminal, settings, store);
    ratatui::restore();

    result
}

/// Runs the main TUI event loop.
fn run_tui(
    mut terminal: ratatui::DefaultTerminal,
    settings: config::AppSettings,
    store: TomlSettingsStore,
) -> Result<()> {
    let events = EventHandler::new(settings.tick_rate);
    let poll_interval = settings.poll_duration();
    let mut app = App::new(
        settings,
        Box::new(store),
        CommandRunner::system(),
        events.sender(),
    );
    let size = terminal.size()?;
    app.terminal_size = (size.width, size.height);

    // First tick fires immediately and doubles as the startup status query.
    let _poller = PollingScheduler::spawn(
        poll_interval,
        events.sender(),
        Event::Message(Message::Poll),
    );

    terminal.draw(|frame| ui::render(frame, &mut app))?;

    while !app.should_quit {
        app.handle_event(events.next()?);

        // Drain whatever else arrived so background results show up at once
        for event in events.pending() {
            app.handle_event(event);
        }
        terminal.draw(|frame| ui::render(frame, &mut app))?;
    }

    Ok(())
}
