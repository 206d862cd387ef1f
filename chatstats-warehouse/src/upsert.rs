//! Insert-only upsert through a staging table.
//!
//! Records are loaded into a fresh staging table with the target's schema,
//! then merged with a single set-based statement that inserts only ids the
//! target does not have yet. Re-running over an overlapping time window
//! therefore never duplicates rows, and no per-record existence checks are
//! needed. The staging table is dropped on every exit path.

use crate::error::{WarehouseError, WarehouseResult};
use crate::schema::{TableRef, TableSchema};
use crate::warehouse::Warehouse;
use chatstats_model::Record;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

impl Warehouse {
    /// Merge `records` into `table_id`, inserting those whose id is not
    /// present yet and leaving existing rows untouched. Returns the number
    /// of rows added. An empty batch makes no client calls.
    pub fn upsert<R: Serialize>(&self, table_id: &str, records: &[R]) -> WarehouseResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        let schema = self.get_table_schema(table_id)?;
        let target = self.table(table_id);
        if schema.field("id").is_none() {
            return Err(WarehouseError::MissingIdColumn(target.to_string()));
        }

        let staging = self.table(&staging_table_name(table_id));
        self.client().create_table(&staging, &schema)?;
        debug!(%staging, rows = rows.len(), "staging table created");

        let result = self.load_and_merge(&target, &staging, &schema, &rows);
        let cleanup = self.client().delete_table(&staging);
        let inserted = finish_with_cleanup(result, cleanup, &staging)?;

        info!(table = %target, batch = rows.len(), inserted, "Upsert complete");
        Ok(inserted)
    }

    /// [`Warehouse::upsert`] into the record type's own table.
    pub fn upsert_records<R: Record>(&self, records: &[R]) -> WarehouseResult<usize> {
        self.upsert(R::TABLE, records)
    }

    fn load_and_merge(
        &self,
        target: &TableRef,
        staging: &TableRef,
        schema: &TableSchema,
        rows: &[serde_json::Value],
    ) -> WarehouseResult<usize> {
        let errors = self.client().insert_rows(staging, schema, rows)?;
        if !errors.is_empty() {
            return Err(WarehouseError::RowsRejected {
                table: staging.to_string(),
                errors,
            });
        }

        self.client().execute(&merge_sql(target, staging))
    }
}

/// Staging table name: target name plus a time-ordered unique suffix.
fn staging_table_name(table_id: &str) -> String {
    format!("{table_id}_staging_{}", Uuid::now_v7().simple())
}

/// Insert staging rows whose id the target lacks. Duplicate ids inside the
/// batch collapse to one row.
fn merge_sql(target: &TableRef, staging: &TableRef) -> String {
    format!(
        "INSERT INTO {target} \
         SELECT DISTINCT ON (src.id) src.* FROM {staging} AS src \
         WHERE NOT EXISTS (SELECT 1 FROM {target} AS dst WHERE dst.id = src.id)",
        target = target.sql(),
        staging = staging.sql(),
    )
}

fn finish_with_cleanup(
    result: WarehouseResult<usize>,
    cleanup: WarehouseResult<()>,
    staging: &TableRef,
) -> WarehouseResult<usize> {
    match (result, cleanup) {
        (Ok(inserted), Ok(())) => Ok(inserted),
        (Err(original), Ok(())) => Err(original),
        (Ok(_), Err(cleanup)) => Err(WarehouseError::Cleanup {
            table: staging.to_string(),
            source: Box::new(cleanup),
        }),
        (Err(original), Err(cleanup)) => Err(WarehouseError::CleanupFailed {
            table: staging.to_string(),
            original: Box::new(original),
            cleanup: Box::new(cleanup),
        }),
    }
}
