//! The warehouse engine: dataset handle plus table metadata cache.

use crate::client::WarehouseClient;
use crate::error::{WarehouseError, WarehouseResult};
use crate::schema::{TableRef, TableSchema};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// One dataset inside the analytical warehouse.
///
/// Migrations (`migrate`) and upserts (`upsert`) are implemented on this type
/// in their own modules. Table schemas fetched through
/// [`Warehouse::get_table_schema`] are cached for the lifetime of the value.
pub struct Warehouse {
    client: Arc<dyn WarehouseClient>,
    dataset: String,
    schema_cache: Mutex<HashMap<String, TableSchema>>,
}

impl Warehouse {
    pub fn new(client: Arc<dyn WarehouseClient>, dataset: &str) -> Self {
        Self {
            client,
            dataset: dataset.to_string(),
            schema_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &dyn WarehouseClient {
        self.client.as_ref()
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Fully qualified reference to `table_id` in this dataset.
    pub fn table(&self, table_id: &str) -> TableRef {
        TableRef::new(&self.dataset, table_id)
    }

    /// Create the dataset unless it already exists.
    pub fn ensure_dataset(&self) -> WarehouseResult<()> {
        if self.client.dataset_exists(&self.dataset)? {
            return Ok(());
        }
        self.client.create_dataset(&self.dataset)?;
        info!(dataset = %self.dataset, "Dataset created");
        Ok(())
    }

    /// Create `table_id` with `schema` unless it already exists.
    /// Returns whether the table was created.
    pub fn ensure_table(&self, table_id: &str, schema: &TableSchema) -> WarehouseResult<bool> {
        let table = self.table(table_id);
        if self.client.get_table(&table)?.is_some() {
            debug!(%table, "table already exists");
            return Ok(false);
        }
        self.client.create_table(&table, schema)?;
        info!(%table, "Table created");
        Ok(true)
    }

    /// Schema of `table_id`, fetched from the client once and then served
    /// from the cache.
    pub fn get_table_schema(&self, table_id: &str) -> WarehouseResult<TableSchema> {
        if let Some(schema) = self.lock_cache().get(table_id) {
            return Ok(schema.clone());
        }

        let table = self.table(table_id);
        let schema = self
            .client
            .get_table(&table)?
            .ok_or_else(|| WarehouseError::TableNotFound(table.to_string()))?;

        self.lock_cache()
            .insert(table_id.to_string(), schema.clone());
        Ok(schema)
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<String, TableSchema>> {
        self.schema_cache.lock().unwrap_or_else(|poisoned| {
            warn!("recovering from poisoned schema cache mutex");
            poisoned.into_inner()
        })
    }
}
