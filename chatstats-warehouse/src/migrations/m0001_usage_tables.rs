use super::Migration;
use crate::error::WarehouseResult;
use crate::schema::{FieldType, SchemaField, TableSchema};
use crate::warehouse::Warehouse;
use chatstats_model::{Conversation, Message, Record, Transaction};

pub(super) const MIGRATION: Migration = Migration {
    name: "0001",
    description: "Create tables for Message, Transaction and Conversation",
    apply,
};

fn apply(warehouse: &Warehouse) -> WarehouseResult<()> {
    warehouse.ensure_table(
        Message::TABLE,
        &TableSchema::new(vec![
            SchemaField::required("id", FieldType::String),
            SchemaField::required("user_id", FieldType::String),
            SchemaField::required("conversation_id", FieldType::String),
            SchemaField::required("date", FieldType::Timestamp),
            SchemaField::required("sender", FieldType::String),
            SchemaField::required("endpoint", FieldType::String),
            SchemaField::required("model", FieldType::String),
        ]),
    )?;

    warehouse.ensure_table(
        Transaction::TABLE,
        &TableSchema::new(vec![
            SchemaField::required("id", FieldType::String),
            SchemaField::required("user_id", FieldType::String),
            SchemaField::required("conversation_id", FieldType::String),
            SchemaField::required("context", FieldType::String),
            SchemaField::required("date", FieldType::Timestamp),
            SchemaField::required("model", FieldType::String),
            SchemaField::required("pricing_type", FieldType::String),
            SchemaField::required("token_count", FieldType::Integer),
            SchemaField::required("usd_per_million", FieldType::Float64),
            SchemaField::required("usd_total", FieldType::Float64),
        ]),
    )?;

    warehouse.ensure_table(
        Conversation::TABLE,
        &TableSchema::new(vec![
            SchemaField::required("id", FieldType::String),
            SchemaField::required("user_id", FieldType::String),
            SchemaField::required("date", FieldType::Timestamp),
            SchemaField::required("endpoint", FieldType::String),
            SchemaField::required("model", FieldType::String),
        ]),
    )?;

    Ok(())
}
