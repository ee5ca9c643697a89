//! Unit tests for key resolution, SQL building, and insert validation.

use admin_sdk::sql;
use admin_sdk::{
    resolve_key, FieldDef, FieldType, ModelBinding, ModelSchema, PanelError, ResolvedKey,
};
use serde_json::{json, Map, Value};

fn client_binding() -> ModelBinding {
    ModelBinding::new(
        "Client",
        "client",
        "clients",
        ModelSchema::new(vec![
            FieldDef::new("client_id", FieldType::BigInt).with_default(),
            FieldDef::new("client", FieldType::Text),
            FieldDef::new("description", FieldType::Text).nullable(),
        ]),
    )
    .pk("client_id")
}

fn program_binding() -> ModelBinding {
    ModelBinding::new(
        "Program",
        "program",
        "programs",
        ModelSchema::new(vec![
            FieldDef::new("org_id", FieldType::BigInt),
            FieldDef::new("program_id", FieldType::BigInt),
            FieldDef::new("program_name", FieldType::Text),
        ]),
    )
    .composite_pk(vec!["org_id".into(), "program_id".into()])
}

fn obj(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => panic!("expected object"),
    }
}

#[test]
fn scalar_key_prefers_body_over_path() {
    let binding = client_binding();
    let body = obj(json!({ "client_id": 7 }));
    let key = resolve_key(&binding, Some(&body), Some("42")).unwrap();
    assert_eq!(key, ResolvedKey::Key(vec![("client_id".into(), json!(7))]));
}

#[test]
fn scalar_key_from_path_is_coerced_to_integer() {
    let binding = client_binding();
    let key = resolve_key(&binding, None, Some("42")).unwrap();
    assert_eq!(key, ResolvedKey::Key(vec![("client_id".into(), json!(42))]));
}

#[test]
fn scalar_key_missing_everywhere_is_none() {
    let binding = client_binding();
    let body = obj(json!({ "client": "acme" }));
    assert_eq!(resolve_key(&binding, Some(&body), None).unwrap(), ResolvedKey::None);
    assert_eq!(resolve_key(&binding, None, None).unwrap(), ResolvedKey::None);
}

#[test]
fn composite_key_zips_fields_to_segments_in_order() {
    let binding = program_binding();
    let key = resolve_key(&binding, None, Some("3/9")).unwrap();
    assert_eq!(
        key,
        ResolvedKey::Key(vec![
            ("org_id".into(), json!(3)),
            ("program_id".into(), json!(9)),
        ])
    );
}

#[test]
fn composite_segment_count_mismatch_reports_both_sides() {
    let binding = program_binding();
    let err = resolve_key(&binding, None, Some("5")).unwrap_err();
    match err {
        PanelError::InvalidKeyCount { expected, supplied } => {
            assert_eq!(expected, vec!["org_id", "program_id"]);
            assert_eq!(supplied, vec!["5"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn composite_without_path_id_resolves_no_key() {
    let binding = program_binding();
    let body = obj(json!({ "program_name": "alpha" }));
    assert_eq!(resolve_key(&binding, Some(&body), None).unwrap(), ResolvedKey::None);
}

#[test]
fn select_by_key_uses_every_key_field() {
    let binding = program_binding();
    let key = vec![
        ("org_id".to_string(), json!(3)),
        ("program_id".to_string(), json!(9)),
    ];
    let q = sql::select_by_key(&binding, &key);
    assert_eq!(
        q.sql,
        "SELECT \"org_id\", \"program_id\", \"program_name\" FROM \"public\".\"programs\" \
         WHERE \"org_id\" = $1 AND \"program_id\" = $2"
    );
    assert_eq!(q.params, vec![json!(3), json!(9)]);
}

#[test]
fn insert_omits_defaulted_columns_missing_from_body() {
    let binding = client_binding();
    let body = obj(json!({ "client": "acme" }));
    let q = sql::insert(&binding, &body);
    assert_eq!(
        q.sql,
        "INSERT INTO \"public\".\"clients\" (\"client\", \"description\") VALUES ($1, $2) \
         RETURNING \"client_id\", \"client\", \"description\""
    );
    assert_eq!(q.params, vec![json!("acme"), Value::Null]);
}

#[test]
fn update_sets_only_known_non_key_fields() {
    let binding = client_binding();
    let key = vec![("client_id".to_string(), json!(42))];
    let body = obj(json!({ "bogus": 1, "client": "renamed", "client_id": 42 }));
    let q = sql::update_by_key(&binding, &key, &body);
    assert_eq!(
        q.sql,
        "UPDATE \"public\".\"clients\" SET \"client\" = $1 WHERE \"client_id\" = $2 \
         RETURNING \"client_id\", \"client\", \"description\""
    );
    assert_eq!(q.params, vec![json!("renamed"), json!(42)]);
}

#[test]
fn update_with_nothing_to_set_rereads_the_row() {
    let binding = client_binding();
    let key = vec![("client_id".to_string(), json!(42))];
    let body = obj(json!({ "bogus": 1 }));
    let q = sql::update_by_key(&binding, &key, &body);
    assert!(q.sql.starts_with("SELECT"));
    assert_eq!(q.params, vec![json!(42)]);
}

#[test]
fn delete_returns_the_deleted_row() {
    let binding = client_binding();
    let key = vec![("client_id".to_string(), json!(42))];
    let q = sql::delete_by_key(&binding, &key);
    assert_eq!(
        q.sql,
        "DELETE FROM \"public\".\"clients\" WHERE \"client_id\" = $1 \
         RETURNING \"client_id\", \"client\", \"description\""
    );
}

#[test]
fn uuid_and_timestamp_placeholders_carry_casts() {
    let binding = ModelBinding::new(
        "Event",
        "event",
        "events",
        ModelSchema::new(vec![
            FieldDef::new("event_id", FieldType::Uuid),
            FieldDef::new("created_at", FieldType::Timestamp),
        ]),
    )
    .pk("event_id");
    let body = obj(json!({
        "event_id": "d8f8a7aa-0b0c-4c9f-9a88-79fbc1a3a001",
        "created_at": "2024-01-01T00:00:00Z",
    }));
    let q = sql::insert(&binding, &body);
    assert!(q.sql.contains("$1::uuid"));
    assert!(q.sql.contains("$2::timestamptz"));
}

#[test]
fn validation_flags_unknown_missing_and_mistyped_fields() {
    let binding = client_binding();
    let body = obj(json!({ "bogus": 1, "description": 5 }));
    let err = admin_sdk::service::validate_insert(&binding, &body).unwrap_err();
    match err {
        PanelError::Validation { payload, .. } => {
            assert_eq!(payload["bogus"], "unknown field");
            assert_eq!(payload["client"], "missing required field");
            assert_eq!(payload["description"], "expected string, got number");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn validation_accepts_a_complete_body() {
    let binding = client_binding();
    let body = obj(json!({ "client": "acme", "description": null }));
    assert!(admin_sdk::service::validate_insert(&binding, &body).is_ok());
}
