//! Agenda CLI
//!
//! Command-line interface for Agenda - contacts kept on a remote contact
//! service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agenda_core::{Config, ContactId, ContactScreen, HttpContactService};

mod commands;
mod output;
mod prompt;
mod tui;

use commands::contact::FieldArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Agenda - contacts on a remote contact service")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file to use instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Named environment from the config file
    #[arg(long, global = true, value_name = "NAME")]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List contacts
    #[command(alias = "ls")]
    List {
        /// Only contacts whose name or surnames contain this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show contact details
    Show {
        /// Contact ID
        id: ContactId,
    },
    /// Create a new contact (prompts for fields when no flags are given)
    #[command(alias = "add")]
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit a contact (prompts for fields when no flags are given)
    Edit {
        /// Contact ID
        id: ContactId,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a contact
    #[command(alias = "rm")]
    Delete {
        /// Contact ID
        id: ContactId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (base_url, environment, environments.<name>,
        /// request_timeout_secs, data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file itself and never reach the service
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let mut config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    config.select_environment(cli.env.clone());

    // Handle TUI (default when no command given)
    if matches!(&cli.command, Some(Commands::Tui) | None) {
        let screen = open_screen(&config)?;
        return tui::run(screen, &config).await;
    }

    init_cli_logging();
    let mut screen = open_screen(&config)?;

    match cli.command {
        Some(Commands::List { search }) => {
            commands::contact::list(&mut screen, search, &output).await
        }
        Some(Commands::Show { id }) => commands::contact::show(&mut screen, id, &output).await,
        Some(Commands::Create { fields }) => {
            commands::contact::create(&mut screen, fields, &output).await
        }
        Some(Commands::Edit { id, fields }) => {
            commands::contact::edit(&mut screen, id, fields, &output).await
        }
        Some(Commands::Delete { id, yes }) => {
            commands::contact::delete(&mut screen, id, yes, &output).await
        }
        Some(Commands::Tui) | Some(Commands::Config { .. }) | None => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Build a screen backed by the configured contact service
fn open_screen(config: &Config) -> Result<ContactScreen> {
    let url = config.service_url()?;
    let service = HttpContactService::new(&url, config.request_timeout())
        .context("Failed to create HTTP client")?;
    Ok(ContactScreen::new(Arc::new(service)))
}

/// Initialize logging for one-shot commands
///
/// Only initializes if AGENDA_LOG is set. Logs go to stderr so they never
/// mix with command output.
fn init_cli_logging() {
    let Ok(log_level) = std::env::var("AGENDA_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("agenda_core={},agenda={}", log_level, log_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
