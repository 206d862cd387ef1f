mod support;

use chatstats_model::{Context, Message, PricingType, Transaction, User};
use chatstats_warehouse::WarehouseError;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{Failures, ids, migrated_warehouse, sample_message, sorted_strings, table_names};

fn no_staging_tables(warehouse: &chatstats_warehouse::Warehouse) -> bool {
    table_names(warehouse)
        .iter()
        .all(|name| !name.contains("_staging_"))
}

// ── Basic behavior ───────────────────────────────────────────────

#[test]
fn empty_batch_makes_no_client_calls() {
    let (warehouse, client) = migrated_warehouse(Failures::default());
    let inserted = warehouse.upsert::<Message>("message", &[]).unwrap();

    assert_eq!(inserted, 0);
    assert!(client.calls().is_empty());
}

#[test]
fn inserts_into_empty_table() {
    let (warehouse, _) = migrated_warehouse(Failures::default());
    let batch = vec![sample_message("a", "gpt-4o"), sample_message("b", "gpt-4o")];

    let inserted = warehouse.upsert_records(&batch).unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(ids(&warehouse, "message"), vec!["a", "b"]);
    assert!(no_staging_tables(&warehouse));
}

#[test]
fn existing_rows_are_left_untouched() {
    let (warehouse, _) = migrated_warehouse(Failures::default());
    warehouse
        .upsert_records(&[sample_message("A", "old-model")])
        .unwrap();

    let inserted = warehouse
        .upsert_records(&[
            sample_message("A", "new-model"),
            sample_message("B", "new-model"),
        ])
        .unwrap();

    assert_eq!(inserted, 1);
    assert_eq!(ids(&warehouse, "message"), vec!["A", "B"]);
    let model_of_a = sorted_strings(
        &warehouse,
        &format!(
            "SELECT model FROM {} WHERE id = 'A'",
            warehouse.table("message").sql()
        ),
    );
    assert_eq!(model_of_a, vec!["old-model"]);
}

#[test]
fn overlapping_windows_never_duplicate() {
    let (warehouse, _) = migrated_warehouse(Failures::default());
    let batch = vec![sample_message("a", "m"), sample_message("b", "m")];

    warehouse.upsert_records(&batch).unwrap();
    let second = warehouse.upsert_records(&batch).unwrap();

    assert_eq!(second, 0);
    assert_eq!(ids(&warehouse, "message"), vec!["a", "b"]);
}

#[test]
fn duplicate_ids_within_batch_insert_once() {
    let (warehouse, _) = migrated_warehouse(Failures::default());
    let batch = vec![sample_message("a", "m1"), sample_message("a", "m2")];

    let inserted = warehouse.upsert_records(&batch).unwrap();

    assert_eq!(inserted, 1);
    assert_eq!(ids(&warehouse, "message"), vec!["a"]);
}

#[test]
fn call_sequence_uses_staging_table() {
    let (warehouse, client) = migrated_warehouse(Failures::default());
    warehouse
        .upsert_records(&[sample_message("a", "m")])
        .unwrap();

    assert_eq!(
        client.calls(),
        vec![
            "get_table",
            "create_table",
            "insert_rows",
            "execute",
            "delete_table"
        ]
    );
}

// ── Metadata cache ───────────────────────────────────────────────

#[test]
fn schema_is_fetched_once_per_table() {
    let (warehouse, client) = migrated_warehouse(Failures::default());
    warehouse.upsert_records(&[sample_message("a", "m")]).unwrap();
    warehouse.upsert_records(&[sample_message("b", "m")]).unwrap();
    warehouse.get_table_schema("message").unwrap();

    assert_eq!(client.count("get_table"), 1);
}

#[test]
fn missing_table_is_not_cached() {
    let (warehouse, client) = migrated_warehouse(Failures::default());
    let err = warehouse.get_table_schema("later").unwrap_err();
    assert!(matches!(err, WarehouseError::TableNotFound(_)));

    warehouse
        .ensure_table(
            "later",
            &chatstats_warehouse::TableSchema::new(vec![chatstats_warehouse::SchemaField::required(
                "id",
                chatstats_warehouse::FieldType::String,
            )]),
        )
        .unwrap();
    client.clear();

    assert!(warehouse.get_table_schema("later").is_ok());
    assert!(warehouse.get_table_schema("later").is_ok());
    assert_eq!(client.count("get_table"), 1);
}

// ── Failure and cleanup ──────────────────────────────────────────

#[test]
fn missing_target_table_creates_no_staging() {
    let (warehouse, client) = migrated_warehouse(Failures::default());
    let err = warehouse
        .upsert("nowhere", &[json!({"id": "x"})])
        .unwrap_err();

    assert!(matches!(err, WarehouseError::TableNotFound(_)));
    assert_eq!(client.count("create_table"), 0);
}

#[test]
fn simulated_insert_failure_cleans_up_staging() {
    let (warehouse, client) = migrated_warehouse(Failures {
        insert: true,
        ..Failures::default()
    });

    let err = warehouse
        .upsert_records(&[sample_message("a", "m")])
        .unwrap_err();

    let rejected = err.rejected_rows().expect("rejected rows reported");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].index, 0);
    assert!(err.to_string().contains("simulated rejection"));
    assert_eq!(client.count("execute"), 0);
    assert_eq!(client.count("delete_table"), 1);
    assert!(no_staging_tables(&warehouse));
    assert!(ids(&warehouse, "message").is_empty());
}

#[test]
fn invalid_rows_are_reported_per_row() {
    let (warehouse, _) = migrated_warehouse(Failures::default());
    let good = serde_json::to_value(sample_message("ok", "m")).unwrap();
    let bad = json!({"id": "broken", "sender": "user"});

    let err = warehouse.upsert("message", &[good, bad]).unwrap_err();

    let rejected = err.rejected_rows().expect("rejected rows reported");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].index, 1);
    assert!(
        rejected[0]
            .errors
            .contains(&"missing required field: user_id".to_string())
    );
    assert!(no_staging_tables(&warehouse));
    assert!(ids(&warehouse, "message").is_empty());
}

#[test]
fn merge_failure_cleans_up_staging() {
    let (warehouse, client) = migrated_warehouse(Failures {
        merge: true,
        ..Failures::default()
    });

    let err = warehouse
        .upsert_records(&[sample_message("a", "m")])
        .unwrap_err();

    assert!(matches!(err, WarehouseError::Client(_)));
    assert_eq!(client.count("delete_table"), 1);
    assert!(no_staging_tables(&warehouse));
}

#[test]
fn cleanup_failure_after_merge_failure_keeps_both_errors() {
    let (warehouse, _) = migrated_warehouse(Failures {
        merge: true,
        delete: true,
        ..Failures::default()
    });

    let err = warehouse
        .upsert_records(&[sample_message("a", "m")])
        .unwrap_err();

    let text = err.to_string();
    assert!(matches!(err, WarehouseError::CleanupFailed { .. }));
    assert!(text.contains("simulated merge failure"));
    assert!(text.contains("simulated delete failure"));
}

#[test]
fn cleanup_failure_after_success_is_surfaced() {
    let (warehouse, _) = migrated_warehouse(Failures {
        delete: true,
        ..Failures::default()
    });

    let err = warehouse
        .upsert_records(&[sample_message("a", "m")])
        .unwrap_err();

    assert!(matches!(err, WarehouseError::Cleanup { .. }));
}

// ── Stored values ────────────────────────────────────────────────

#[test]
fn transaction_values_are_stored_as_typed_columns() {
    let (warehouse, _) = migrated_warehouse(Failures::default());
    let tx = Transaction {
        id: "t1".into(),
        user_id: "u1".into(),
        conversation_id: "c1".into(),
        context: Context::Message,
        date: Utc.with_ymd_and_hms(2024, 5, 1, 8, 15, 0).unwrap(),
        model: "gpt-4o".into(),
        pricing_type: PricingType::Prompt,
        token_count: 50,
        usd_per_million: 2.5,
        usd_total: 0.025,
    };

    warehouse.upsert_records(&[tx]).unwrap();

    let row = warehouse
        .client()
        .query_strings(&format!(
            "SELECT CONCAT_WS('|', context, CAST(date AS VARCHAR), pricing_type, \
             CAST(token_count AS VARCHAR), CAST(usd_total AS VARCHAR)) FROM {}",
            warehouse.table("transaction").sql()
        ))
        .unwrap();
    assert_eq!(row, vec!["message|2024-05-01 08:15:00|prompt|50|0.025"]);
}

#[test]
fn user_records_land_in_user_table() {
    let (warehouse, _) = migrated_warehouse(Failures::default());
    let user = User {
        id: "u1".into(),
        created_at: Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap(),
        domain: "example.com".into(),
    };

    assert_eq!(warehouse.upsert_records(&[user]).unwrap(), 1);
    assert_eq!(ids(&warehouse, "user"), vec!["u1"]);
}
