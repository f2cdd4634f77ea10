//! Tracing subscriber setup.
//!
//! `HIKELOG_LOG` takes an `EnvFilter` directive and overrides `-v`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "HIKELOG_LOG";

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "hikelog=warn",
        1 => "hikelog=info",
        2 => "hikelog=debug",
        _ => "hikelog=trace",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Log to stderr
pub fn init_stderr(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Log to a file, for when the terminal is taken over by the browser
pub fn init_file(path: &Path, verbosity: u8) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {parent:?}"))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {path:?}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
