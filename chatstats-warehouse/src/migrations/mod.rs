//! Versioned schema migrations, tracked in the `migration` ledger table.
//!
//! Each migration is a named procedure in [`MIGRATIONS`]. Names sort
//! lexicographically in execution order (zero-padded sequence numbers), and
//! a shipped migration is never edited: schema changes are appended as new
//! entries. Migrations must be safe to re-run after a partial failure, which
//! is why they create tables through [`Warehouse::ensure_table`].

mod m0001_usage_tables;
mod m0002_user_table;

use crate::error::{WarehouseError, WarehouseResult};
use crate::schema::ledger_schema;
use crate::warehouse::Warehouse;
use chatstats_model::{MigrationRecord, Record};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info};

/// A single schema change.
#[derive(Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    pub description: &'static str,
    pub apply: fn(&Warehouse) -> WarehouseResult<()>,
}

/// Every known migration. Order here is irrelevant; `migrate` sorts by name.
pub const MIGRATIONS: &[Migration] = &[
    m0001_usage_tables::MIGRATION,
    m0002_user_table::MIGRATION,
];

impl Warehouse {
    /// Create the migration ledger unless it already exists.
    pub fn ensure_ledger(&self) -> WarehouseResult<()> {
        self.ensure_table(MigrationRecord::TABLE, &ledger_schema())?;
        Ok(())
    }

    /// Apply every migration in [`MIGRATIONS`] that the ledger does not list.
    /// Returns the names applied by this call.
    pub fn migrate(&self) -> WarehouseResult<Vec<String>> {
        self.migrate_with(MIGRATIONS)
    }

    /// Apply the pending subset of `migrations` in name order, recording each
    /// in the ledger as soon as it succeeds. A failure stops the run; the
    /// failed migration stays unrecorded.
    pub fn migrate_with(&self, migrations: &[Migration]) -> WarehouseResult<Vec<String>> {
        self.ensure_dataset()?;
        self.ensure_ledger()?;

        let mut ordered: Vec<&Migration> = migrations.iter().collect();
        ordered.sort_by_key(|m| m.name);

        let mut applied = self.applied_migrations()?;
        let mut newly_applied = Vec::new();

        for migration in ordered {
            if applied.contains(migration.name) {
                debug!(migration = migration.name, "already applied");
                continue;
            }

            info!(
                migration = migration.name,
                description = migration.description,
                "Applying migration"
            );
            (migration.apply)(self).map_err(|e| WarehouseError::Migration {
                name: migration.name.to_string(),
                source: Box::new(e),
            })?;
            self.record_migration(migration.name)?;

            applied.insert(migration.name.to_string());
            newly_applied.push(migration.name.to_string());
        }

        Ok(newly_applied)
    }

    /// Ids currently recorded in the ledger.
    pub fn applied_migrations(&self) -> WarehouseResult<HashSet<String>> {
        let ledger = self.table(MigrationRecord::TABLE);
        let ids = self
            .client()
            .query_strings(&format!("SELECT id FROM {}", ledger.sql()))?;
        Ok(ids.into_iter().collect())
    }

    fn record_migration(&self, name: &str) -> WarehouseResult<()> {
        let record = MigrationRecord {
            id: name.to_string(),
            apply_date: Utc::now(),
        };
        let ledger = self.table(MigrationRecord::TABLE);
        let schema = self.get_table_schema(MigrationRecord::TABLE)?;
        let row = serde_json::to_value(&record)?;

        let errors = self.client().insert_rows(&ledger, &schema, &[row])?;
        if !errors.is_empty() {
            return Err(WarehouseError::RowsRejected {
                table: ledger.to_string(),
                errors,
            });
        }
        Ok(())
    }
}
