//! The warehouse client seam.
//!
//! Everything the migration engine and the upsert path need from the
//! warehouse goes through [`WarehouseClient`]. [`DuckDbClient`] is the
//! production implementation; tests wrap it to count or fail calls.

mod duckdb_client;
pub(crate) mod rows;

pub use duckdb_client::DuckDbClient;

use crate::error::{RowError, WarehouseResult};
use crate::schema::{TableRef, TableSchema};

/// Blocking operations against the analytical warehouse.
pub trait WarehouseClient: Send + Sync {
    /// Whether the dataset (namespace) exists.
    fn dataset_exists(&self, dataset: &str) -> WarehouseResult<bool>;

    /// Create the dataset. Fails if it already exists.
    fn create_dataset(&self, dataset: &str) -> WarehouseResult<()>;

    /// Schema of `table`, or `None` if the table does not exist.
    fn get_table(&self, table: &TableRef) -> WarehouseResult<Option<TableSchema>>;

    /// Create `table` with `schema`. Fails if it already exists.
    fn create_table(&self, table: &TableRef, schema: &TableSchema) -> WarehouseResult<()>;

    /// Drop `table`. Fails if it does not exist.
    fn delete_table(&self, table: &TableRef) -> WarehouseResult<()>;

    /// Insert JSON object rows into `table`.
    ///
    /// Returns the per-row errors. An empty vector means every row was
    /// inserted; otherwise no row was inserted.
    fn insert_rows(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        rows: &[serde_json::Value],
    ) -> WarehouseResult<Vec<RowError>>;

    /// Run a query and return its first column as strings.
    fn query_strings(&self, sql: &str) -> WarehouseResult<Vec<String>>;

    /// Run a statement to completion and return the number of affected rows.
    fn execute(&self, sql: &str) -> WarehouseResult<usize>;
}
