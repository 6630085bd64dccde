// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stoa - a stoic reflection journal for the terminal.
//!
//! This is the binary entry point. Every subcommand loads the layered
//! configuration first and exits with the rendered diagnostics if it is
//! invalid.

mod app;
mod commands;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use stoa_config::model::StoaConfig;
use stoa_core::types::UserId;
use stoa_core::StoaError;
use tracing::debug;

use crate::app::App;
use crate::shell::ChatOptions;

/// Stoa - a stoic reflection journal.
#[derive(Parser, Debug)]
#[command(name = "stoa", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Journal owner.
    #[arg(long, global = true, default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the mentor to reflect on a note and save the exchange.
    Reflect {
        /// The note. Words are joined with spaces; may be empty.
        note: Vec<String>,
    },
    /// List recent journal entries, newest first.
    History {
        /// Number of entries to show (defaults to context.history_limit).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Talk with the mentor over several turns.
    Chat {
        /// Save each answered turn to the journal.
        #[arg(long)]
        save: bool,
        /// Start from the most recent journal entries instead of a greeting.
        #[arg(long)]
        resume: bool,
    },
    /// Manage Stoa configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate the configuration and print the effective settings.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => stoa_config::load_and_validate_path(path),
        None => stoa_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            stoa_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    if let Err(e) = run(cli.command, UserId::from(cli.user.as_str()), config).await {
        debug!(error = %e, kind = %e.kind(), "command failed");
        eprintln!("{}: {}", "error".red(), e.user_message());
        std::process::exit(1);
    }
}

async fn run(command: Commands, user_id: UserId, config: StoaConfig) -> Result<(), StoaError> {
    if let Commands::Config {
        action: ConfigCommands::Check,
    } = command
    {
        return commands::run_config_check(&config);
    }

    let app = App::open(config).await?;
    let result = match command {
        Commands::Reflect { note } => commands::run_reflect(&app, &user_id, &note.join(" ")).await,
        Commands::History { limit } => commands::run_history(&app, &user_id, limit).await,
        Commands::Chat { save, resume } => {
            shell::run_chat(&app, &user_id, ChatOptions { save, resume }).await
        }
        // Handled before the journal is opened.
        Commands::Config { .. } => Ok(()),
    };
    app.close().await;
    result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stoa={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
