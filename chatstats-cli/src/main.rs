use anyhow::Context as _;
use chatstats_cli::{Cli, Config, init_logging, load_env, run};
use chatstats_extract::ExportDirSource;
use chatstats_warehouse::{DuckDbClient, Warehouse};
use chrono::Utc;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    load_env(cli.env_file.as_deref())?;
    let mut config = Config::from_env()?;
    if let Some(days) = cli.since_days {
        config.set_since_days(days)?;
    }
    let cutoff = config.cutoff(Utc::now())?;

    let client = DuckDbClient::open(&config.warehouse_path, &config.memory_limit, config.threads)
        .with_context(|| format!("opening warehouse {}", config.warehouse_path.display()))?;
    let warehouse = Warehouse::new(Arc::new(client), &config.dataset);
    let source = ExportDirSource::new(&config.export_dir);

    let summary = run(&warehouse, &source, cutoff, cli.migrate_only)?;
    info!(
        migrations = summary.migrations.len(),
        messages = summary.messages,
        transactions = summary.transactions,
        conversations = summary.conversations,
        users = summary.users,
        "run complete"
    );
    Ok(())
}
