//! DuckDB-backed warehouse client.

use super::WarehouseClient;
use super::rows::{SqlValue, bind_row, placeholder};
use crate::error::{RowError, WarehouseError, WarehouseResult};
use crate::schema::{FieldMode, FieldType, SchemaField, TableRef, TableSchema, quote_identifier};
use duckdb::{Connection, ToSql, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Thread-safe warehouse client wrapping a single DuckDB connection.
#[derive(Clone)]
pub struct DuckDbClient {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbClient {
    /// Open (or create) the warehouse database at the given path.
    pub fn open(path: &Path, memory_limit: &str, threads: u32) -> WarehouseResult<Self> {
        let conn = crate::open_warehouse_db(path, memory_limit, threads)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory warehouse (for testing).
    pub fn open_in_memory() -> WarehouseResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection lock, recovering from poison.
    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("recovering from poisoned warehouse connection mutex");
            poisoned.into_inner()
        })
    }
}

impl WarehouseClient for DuckDbClient {
    fn dataset_exists(&self, dataset: &str) -> WarehouseResult<bool> {
        let conn = self.lock_conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = ?",
            params![dataset],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn create_dataset(&self, dataset: &str) -> WarehouseResult<()> {
        let conn = self.lock_conn();
        conn.execute_batch(&format!("CREATE SCHEMA {}", quote_identifier(dataset)))?;
        Ok(())
    }

    fn get_table(&self, table: &TableRef) -> WarehouseResult<Option<TableSchema>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
        )?;

        let columns = stmt
            .query_map(params![table.dataset, table.table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Ok(None);
        }

        let fields = columns
            .into_iter()
            .map(|(name, data_type, nullable)| {
                let field_type = FieldType::from_duckdb(&data_type).ok_or_else(|| {
                    WarehouseError::UnsupportedType {
                        table: table.to_string(),
                        column: name.clone(),
                        data_type: data_type.clone(),
                    }
                })?;
                let mode = if nullable.eq_ignore_ascii_case("YES") {
                    FieldMode::Nullable
                } else {
                    FieldMode::Required
                };
                Ok(SchemaField {
                    name,
                    field_type,
                    mode,
                })
            })
            .collect::<WarehouseResult<Vec<_>>>()?;

        Ok(Some(TableSchema::new(fields)))
    }

    fn create_table(&self, table: &TableRef, schema: &TableSchema) -> WarehouseResult<()> {
        let conn = self.lock_conn();
        conn.execute_batch(&schema.create_table_sql(table))?;
        debug!(%table, "table created");
        Ok(())
    }

    fn delete_table(&self, table: &TableRef) -> WarehouseResult<()> {
        let conn = self.lock_conn();
        conn.execute_batch(&format!("DROP TABLE {}", table.sql()))?;
        debug!(%table, "table dropped");
        Ok(())
    }

    fn insert_rows(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        rows: &[serde_json::Value],
    ) -> WarehouseResult<Vec<RowError>> {
        let mut bound: Vec<Vec<SqlValue>> = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            match bind_row(schema, row) {
                Ok(values) => bound.push(values),
                Err(errors) => rejected.push(RowError { index, errors }),
            }
        }
        if !rejected.is_empty() {
            return Ok(rejected);
        }

        let columns: Vec<String> = schema
            .fields
            .iter()
            .map(|f| quote_identifier(&f.name))
            .collect();
        let placeholders: Vec<&str> = schema.fields.iter().map(placeholder).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.sql(),
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for (index, values) in bound.iter().enumerate() {
                let param_refs: Vec<&dyn ToSql> =
                    values.iter().map(|v| v as &dyn ToSql).collect();
                if let Err(e) = stmt.execute(param_refs.as_slice()) {
                    rejected.push(RowError::new(index, e.to_string()));
                    break;
                }
            }
        }

        if rejected.is_empty() {
            tx.commit()?;
            debug!(%table, rows = rows.len(), "rows inserted");
        } else {
            tx.rollback()?;
        }
        Ok(rejected)
    }

    fn query_strings(&self, sql: &str) -> WarehouseResult<Vec<String>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn execute(&self, sql: &str) -> WarehouseResult<usize> {
        let conn = self.lock_conn();
        Ok(conn.execute(sql, [])?)
    }
}
