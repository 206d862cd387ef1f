//! The run sequence: migrate, then copy each entity kind.

use anyhow::Context as _;
use chatstats_extract::{ExtractResult, RecordSource};
use chatstats_model::Record;
use chatstats_warehouse::Warehouse;
use chrono::{DateTime, Utc};
use std::fmt::Display;
use tracing::{error, info};

/// Rows added per table by one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub migrations: Vec<String>,
    pub messages: usize,
    pub transactions: usize,
    pub conversations: usize,
    pub users: usize,
}

/// Run `step`, logging `✅ title` or `❌ title` before returning its result.
pub fn action<T, E: Display>(title: &str, step: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    match step() {
        Ok(value) => {
            info!("✅ {title}");
            Ok(value)
        }
        Err(e) => {
            error!(error = %e, "❌ {title}");
            Err(e)
        }
    }
}

/// Migrate the warehouse and, unless `migrate_only`, copy every record the
/// source has created since `cutoff`. Stops at the first failing step.
pub fn run(
    warehouse: &Warehouse,
    source: &dyn RecordSource,
    cutoff: DateTime<Utc>,
    migrate_only: bool,
) -> anyhow::Result<RunSummary> {
    let migrations = action("Migrate warehouse", || warehouse.migrate())?;
    let mut summary = RunSummary {
        migrations,
        ..RunSummary::default()
    };
    if migrate_only {
        return Ok(summary);
    }

    info!(%cutoff, dataset = warehouse.dataset(), "copying records");
    summary.messages = copy(warehouse, "Copy messages", || source.messages_since(cutoff))?;
    summary.transactions = copy(warehouse, "Copy transactions", || {
        source.transactions_since(cutoff)
    })?;
    summary.conversations = copy(warehouse, "Copy conversations", || {
        source.conversations_since(cutoff)
    })?;
    summary.users = copy(warehouse, "Copy users", || source.users_since(cutoff))?;
    Ok(summary)
}

fn copy<R: Record>(
    warehouse: &Warehouse,
    title: &str,
    extract: impl FnOnce() -> ExtractResult<Vec<R>>,
) -> anyhow::Result<usize> {
    action(title, || {
        let records = extract().with_context(|| format!("extracting {} records", R::TABLE))?;
        warehouse
            .upsert_records(&records)
            .with_context(|| format!("upserting into {}", R::TABLE))
    })
}
