use super::Migration;
use crate::error::WarehouseResult;
use crate::schema::{FieldType, SchemaField, TableSchema};
use crate::warehouse::Warehouse;
use chatstats_model::{Record, User};

pub(super) const MIGRATION: Migration = Migration {
    name: "0002",
    description: "Create table for User",
    apply,
};

fn apply(warehouse: &Warehouse) -> WarehouseResult<()> {
    warehouse.ensure_table(
        User::TABLE,
        &TableSchema::new(vec![
            SchemaField::required("id", FieldType::String),
            SchemaField::required("created_at", FieldType::Timestamp),
            SchemaField::required("domain", FieldType::String),
        ]),
    )?;
    Ok(())
}
