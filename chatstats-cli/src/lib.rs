//! Runner for the chatstats copy job.
//!
//! Reads configuration from the environment (optionally seeded from a `.env`
//! file), brings the warehouse schema up to date, and copies the messages,
//! transactions, conversations and users created inside the extraction
//! window.

mod cli;
mod config;
mod runner;

pub use cli::Cli;
pub use config::{Config, ConfigError, MAX_SINCE_DAYS};
pub use runner::{RunSummary, action, run};

use anyhow::Context as _;
use std::path::Path;

/// Install the stderr log subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load `env_file` into the process environment, or `./.env` if present.
/// Variables already set are not overridden.
pub fn load_env(env_file: Option<&Path>) -> anyhow::Result<()> {
    match env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("loading environment file {}", path.display()))?;
        }
        None => match dotenv::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("loading .env"),
        },
    }
    Ok(())
}
