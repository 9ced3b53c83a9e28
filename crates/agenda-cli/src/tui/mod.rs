//! Agenda TUI
//!
//! Terminal user interface for Agenda.
//!
//! ## Layout
//!
//! Two-pane layout:
//! - Left: Contact list (filtered by the active search)
//! - Right: Detail of the viewed or selected contact
//!
//! The edit/create form and the delete confirmation open as popups.
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down
//! - Enter: View contact, Esc: close it
//! - /: Search by name or surname
//! - q: Quit
//!
//! ## Commands
//!
//! - n: New contact
//! - e: Edit contact
//! - d: Delete contact (asks y/n)
//! - r: Reload from the service

mod app;
mod requests;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agenda_core::{Config, ContactScreen};

use app::{App, InputMode};
use requests::{Reply, Request};

/// Run the TUI application
pub async fn run(screen: ContactScreen, config: &Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if AGENDA_LOG is set)
    init_tui_logging(config);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(screen);

    // Run app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let service = app.screen.service();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<Reply>();

    // Initial fetch
    let request = app.reload();
    requests::spawn(&service, request, &reply_tx);

    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            // Replies from the contact service
            Some(reply) = reply_rx.recv() => {
                app.apply(reply);
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                // Check for terminal events (non-blocking)
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        if let Some(request) = handle_key(app, key.code, key.modifiers) {
                            requests::spawn(&service, request, &reply_tx);
                        }
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Route a key press to the active overlay or mode
fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<Request> {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return None;
    }

    // If help is showing, any key dismisses it
    if app.show_help {
        app.show_help = false;
        return None;
    }

    // Delete popup: y confirms, anything else cancels
    if app.pending_delete.is_some() {
        return app.answer_delete(matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')));
    }

    if app.form_open() {
        return handle_form_mode(app, code, modifiers);
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, code),
        InputMode::Search => {
            handle_search_mode(app, code);
            None
        }
    }
}

/// Handle key events in normal mode
fn handle_normal_mode(app: &mut App, code: KeyCode) -> Option<Request> {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Up | KeyCode::Down
    ) {
        app.status_message = None;
    }

    match code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('g') | KeyCode::Home => app.move_to_first(),
        KeyCode::Char('G') | KeyCode::End => app.move_to_last(),

        KeyCode::Enter => app.open_detail(),
        KeyCode::Esc => app.close_detail(),

        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('r') => return Some(app.reload()),
        KeyCode::Char('e') => return app.begin_edit(),
        KeyCode::Char('n') => app.begin_create(),
        KeyCode::Char('d') => app.request_delete(),

        _ => {}
    }

    None
}

/// Handle key events while the edit/create form is open
fn handle_form_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<Request> {
    match code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Enter => return app.submit_form(),

        KeyCode::Tab | KeyCode::Down => app.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.prev_field(),

        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.form_clear_field();
        }
        KeyCode::Char(c) => app.form_insert_char(c),
        KeyCode::Backspace => app.form_delete_char(),

        _ => {}
    }

    None
}

/// Handle key events in search mode
fn handle_search_mode(app: &mut App, code: KeyCode) {
    match code {
        // Cancel search
        KeyCode::Esc => app.clear_search(),

        // Confirm search (stay in filtered view)
        KeyCode::Enter => app.exit_search_mode(),

        // Text input
        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),

        _ => {}
    }
}

/// Initialize logging for TUI mode
///
/// Only initializes if AGENDA_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    // Only log if AGENDA_LOG is set
    let Ok(log_level) = std::env::var("AGENDA_LOG") else {
        return;
    };

    if let Err(e) = config.ensure_data_dir() {
        eprintln!("Warning: {:#}", e);
        return;
    }

    let log_path = config.log_path();
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("agenda_core={},agenda={}", log_level, log_level));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
