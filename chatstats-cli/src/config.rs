//! Environment configuration.

use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use thiserror::Error;

pub const EXPORT_DIR: &str = "CHATSTATS_EXPORT_DIR";
pub const WAREHOUSE_PATH: &str = "CHATSTATS_WAREHOUSE_PATH";
pub const DATASET: &str = "CHATSTATS_DATASET";
pub const MEMORY_LIMIT: &str = "CHATSTATS_MEMORY_LIMIT";
pub const THREADS: &str = "CHATSTATS_THREADS";
pub const SINCE_DAYS: &str = "SINCE_DAYS";

const DEFAULT_MEMORY_LIMIT: &str = "512MB";
const DEFAULT_THREADS: u32 = 2;
const DEFAULT_SINCE_DAYS: u32 = 2;
/// Longest extraction window accepted, about a thousand years.
pub const MAX_SINCE_DAYS: u32 = 365_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),
}

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the `<collection>.json` export files.
    pub export_dir: PathBuf,
    /// DuckDB database file.
    pub warehouse_path: PathBuf,
    pub dataset: String,
    pub memory_limit: String,
    pub threads: u32,
    /// Width of the extraction window, in days back from now.
    pub since_days: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, reporting every absent or malformed
    /// variable at once. Empty values count as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut missing = Vec::new();

        let mut required = |key: &str| {
            let value = get(key);
            if value.is_none() {
                missing.push(key.to_string());
            }
            value.unwrap_or_default()
        };
        let export_dir = required(EXPORT_DIR);
        let warehouse_path = required(WAREHOUSE_PATH);
        let dataset = required(DATASET);

        let mut number = |key: &str, default: u32| match get(key) {
            None => default,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                missing.push(key.to_string());
                default
            }),
        };
        let threads = number(THREADS, DEFAULT_THREADS);
        let since_days = number(SINCE_DAYS, DEFAULT_SINCE_DAYS);
        if since_days > MAX_SINCE_DAYS {
            missing.push(SINCE_DAYS.to_string());
        }

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        Ok(Self {
            export_dir: PathBuf::from(export_dir),
            warehouse_path: PathBuf::from(warehouse_path),
            dataset,
            memory_limit: get(MEMORY_LIMIT).unwrap_or_else(|| DEFAULT_MEMORY_LIMIT.to_string()),
            threads,
            since_days,
        })
    }

    /// Replace the window width, e.g. from a command-line flag.
    pub fn set_since_days(&mut self, days: u32) -> Result<(), ConfigError> {
        if days > MAX_SINCE_DAYS {
            return Err(ConfigError::Missing(vec![SINCE_DAYS.to_string()]));
        }
        self.since_days = days;
        Ok(())
    }

    /// Start of the extraction window relative to `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigError> {
        Duration::try_days(i64::from(self.since_days))
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| ConfigError::Missing(vec![SINCE_DAYS.to_string()]))
    }
}
