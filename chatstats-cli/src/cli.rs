use clap::Parser;
use std::path::PathBuf;

/// Copy recent chat usage records into the analytical warehouse.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Days back from now to extract (overrides SINCE_DAYS).
    #[arg(long, value_name = "DAYS")]
    pub since_days: Option<u32>,
    /// Environment file to load instead of ./.env.
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,
    /// Bring the warehouse schema up to date and stop.
    #[arg(long)]
    pub migrate_only: bool,
}
