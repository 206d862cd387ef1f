//! DuckDB analytical warehouse for chatstats.
//!
//! # Architecture
//!
//! - A dataset is a DuckDB schema inside one database file
//! - Schema changes are versioned migrations recorded in a `migration`
//!   ledger table, applied in name order exactly once
//! - Records are merged through per-call staging tables, so overlapping
//!   extraction windows never produce duplicate rows
//! - All warehouse access goes through the [`WarehouseClient`] trait

mod client;
mod error;
mod migrations;
mod open;
mod schema;
mod upsert;
mod warehouse;

pub use client::{DuckDbClient, WarehouseClient};
pub use error::{RowError, WarehouseError, WarehouseResult};
pub use migrations::{MIGRATIONS, Migration};
pub use open::open_warehouse_db;
pub use schema::{
    FieldMode, FieldType, SchemaField, TableRef, TableSchema, ledger_schema, quote_identifier,
};
pub use warehouse::Warehouse;
