//! Shared test helpers: an in-memory warehouse behind a client wrapper that
//! records every call and can simulate failures.

#![allow(dead_code)]

use chatstats_model::{Message, Sender};
use chatstats_warehouse::{
    DuckDbClient, RowError, TableRef, TableSchema, Warehouse, WarehouseClient, WarehouseError,
    WarehouseResult,
};
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};

pub const DATASET: &str = "stats";

/// Which client operations should fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Failures {
    pub insert: bool,
    pub merge: bool,
    pub delete: bool,
}

/// Wraps a real in-memory DuckDB client, logging calls by method name.
pub struct RecordingClient {
    inner: DuckDbClient,
    calls: Mutex<Vec<String>>,
    failures: Mutex<Failures>,
}

impl RecordingClient {
    pub fn new(failures: Failures) -> Self {
        Self {
            inner: DuckDbClient::open_in_memory().unwrap(),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(failures),
        }
    }

    pub fn set_failures(&self, failures: Failures) {
        *self.failures.lock().unwrap() = failures;
    }

    fn failures(&self) -> Failures {
        *self.failures.lock().unwrap()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl WarehouseClient for RecordingClient {
    fn dataset_exists(&self, dataset: &str) -> WarehouseResult<bool> {
        self.record("dataset_exists");
        self.inner.dataset_exists(dataset)
    }

    fn create_dataset(&self, dataset: &str) -> WarehouseResult<()> {
        self.record("create_dataset");
        self.inner.create_dataset(dataset)
    }

    fn get_table(&self, table: &TableRef) -> WarehouseResult<Option<TableSchema>> {
        self.record("get_table");
        self.inner.get_table(table)
    }

    fn create_table(&self, table: &TableRef, schema: &TableSchema) -> WarehouseResult<()> {
        self.record("create_table");
        self.inner.create_table(table, schema)
    }

    fn delete_table(&self, table: &TableRef) -> WarehouseResult<()> {
        self.record("delete_table");
        if self.failures().delete {
            return Err(WarehouseError::Client("simulated delete failure".into()));
        }
        self.inner.delete_table(table)
    }

    fn insert_rows(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        rows: &[serde_json::Value],
    ) -> WarehouseResult<Vec<RowError>> {
        self.record("insert_rows");
        if self.failures().insert {
            return Ok(vec![RowError::new(0, "simulated rejection")]);
        }
        self.inner.insert_rows(table, schema, rows)
    }

    fn query_strings(&self, sql: &str) -> WarehouseResult<Vec<String>> {
        self.record("query_strings");
        self.inner.query_strings(sql)
    }

    fn execute(&self, sql: &str) -> WarehouseResult<usize> {
        self.record("execute");
        if self.failures().merge {
            return Err(WarehouseError::Client("simulated merge failure".into()));
        }
        self.inner.execute(sql)
    }
}

/// A migrated in-memory warehouse plus a handle on its recording client.
/// `failures` take effect once migrations have run.
pub fn migrated_warehouse(failures: Failures) -> (Warehouse, Arc<RecordingClient>) {
    let client = Arc::new(RecordingClient::new(Failures::default()));
    let warehouse = Warehouse::new(client.clone(), DATASET);
    warehouse.migrate().unwrap();
    client.set_failures(failures);
    client.clear();
    (warehouse, client)
}

/// Sorted values of the first column of `sql`.
pub fn sorted_strings(warehouse: &Warehouse, sql: &str) -> Vec<String> {
    let mut values = warehouse.client().query_strings(sql).unwrap();
    values.sort();
    values
}

/// Sorted ids in `table_id`.
pub fn ids(warehouse: &Warehouse, table_id: &str) -> Vec<String> {
    let table = warehouse.table(table_id);
    sorted_strings(warehouse, &format!("SELECT id FROM {}", table.sql()))
}

/// Names of every table in the test dataset.
pub fn table_names(warehouse: &Warehouse) -> Vec<String> {
    sorted_strings(
        warehouse,
        &format!(
            "SELECT table_name FROM information_schema.tables WHERE table_schema = '{DATASET}'"
        ),
    )
}

pub fn sample_message(id: &str, model: &str) -> Message {
    Message {
        id: id.into(),
        user_id: "user-1".into(),
        conversation_id: "conv-1".into(),
        date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        sender: Sender::User,
        endpoint: "openAI".into(),
        model: model.into(),
    }
}
