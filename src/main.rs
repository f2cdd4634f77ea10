//! hikelog: a hike journal for the terminal
//!
//! Hikes and the observations made along the way are kept in a local SQLite
//! database. Subcommands add, edit, search and remove records, and `browse`
//! opens a keyboard-driven view over the whole journal.

mod app;
mod cli;
mod commands;
mod data;
mod form;
mod logging;
mod ui;

use std::io;

use anyhow::{Context, Result};
use cli::{AppConfig, Cli, Commands};
use data::Store;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();
    let config = AppConfig::from_cli(cli.db_path, cli.verbose);

    // The browser owns the terminal, so its logs go to a file
    match cli.command {
        Commands::Browse => logging::init_file(&config.log_path(), config.verbosity)?,
        _ => logging::init_stderr(config.verbosity),
    }

    let store = Store::open(&config.db_path)
        .with_context(|| format!("Failed to open hike database: {:?}", config.db_path))?;

    match cli.command {
        Commands::Browse => return app::run(store),
        Commands::Hike(command) => {
            commands::run_hike(&store, command, &mut io::stdout().lock())?;
        }
        Commands::Observation(command) => {
            commands::run_observation(&store, command, &mut io::stdout().lock())?;
        }
    }

    store.close().context("Failed to close hike database")?;
    Ok(())
}
