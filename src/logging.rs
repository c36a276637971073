//! Logging setup.
//!
//! `MMDPAD_LOG` takes precedence over `RUST_LOG`; with neither set the level
//! is `info`. The terminal UI logs to `mmdpad.log` in the data directory so
//! output never lands on the alternate screen. CLI subcommands log to stderr.

use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_FILE: &str = "mmdpad.log";

fn filter() -> EnvFilter {
    env::var("MMDPAD_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Append logs to `<data_dir>/mmdpad.log`
pub fn init_file(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {:?}", data_dir))?;
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    // A second init (tests) is harmless
    let _ = fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/// Log to stderr, for one-shot subcommands
pub fn init_stderr() {
    let _ = fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .try_init();
}
