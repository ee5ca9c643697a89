//! Database-backed tests for the CRUD verb semantics.
//!
//! These exercise the branches that run after a row fetch: single-record GET,
//! the POST upsert sequence, DELETE on a missing key, PATCH field filtering,
//! and unique-violation translation. They need a live PostgreSQL at
//! `DATABASE_URL`; when the variable is unset the tests skip. Each test
//! creates its own uniquely named table and drops it on the way out.

use admin_sdk::{
    AdminPanel, AuthBackend, BasicViews, FieldDef, FieldType, ModelBinding, ModelSchema,
    PanelError, SessionData, SessionService, UserData,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt; // for oneshot
use uuid::Uuid;

/// Grants the superuser group whenever the request carries `x-test-groups`.
struct HeaderSessions;

#[async_trait]
impl SessionService for HeaderSessions {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<SessionData>, PanelError> {
        let Some(v) = headers.get("x-test-groups") else {
            return Ok(None);
        };
        let s = v.to_str().unwrap_or("");
        Ok(Some(SessionData::from_groups(
            s.split(',').map(String::from).collect(),
        )))
    }

    async fn load_session(&self, _user: &UserData) -> Result<(), PanelError> {
        Ok(())
    }

    async fn forget(&self, _headers: &HeaderMap) -> Result<(), PanelError> {
        Ok(())
    }
}

/// Connect to the test database, or `None` when no `DATABASE_URL` is set.
async fn test_db() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    };
    Some(
        PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test database"),
    )
}

/// Create a scratch clients table with a unique name for this test run.
async fn create_clients_table(pool: &PgPool) -> String {
    let table = format!("clients_{}", Uuid::new_v4().simple());
    sqlx::query(&format!(
        "CREATE TABLE \"{}\" (
             client_id BIGSERIAL PRIMARY KEY,
             client TEXT NOT NULL UNIQUE,
             description TEXT
         )",
        table
    ))
    .execute(pool)
    .await
    .expect("Failed to create scratch table");
    table
}

async fn drop_table(pool: &PgPool, table: &str) {
    sqlx::query(&format!("DROP TABLE \"{}\"", table))
        .execute(pool)
        .await
        .expect("Failed to drop scratch table");
}

fn client_binding(table: &str) -> ModelBinding {
    ModelBinding::new(
        "Client",
        "client",
        table,
        ModelSchema::new(vec![
            FieldDef::new("client_id", FieldType::BigInt).with_default(),
            FieldDef::new("client", FieldType::Text),
            FieldDef::new("description", FieldType::Text).nullable(),
        ]),
    )
    .pk("client_id")
}

fn app(pool: PgPool, table: &str) -> Router {
    let backends: HashMap<String, Arc<dyn AuthBackend>> = HashMap::new();
    AdminPanel::new("Test Admin")
        .add_model(client_binding(table))
        .router(pool, Arc::new(HeaderSessions), backends, Arc::new(BasicViews))
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-test-groups", "superuser");
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[tokio::test]
async fn single_get_returns_record_and_miss_is_403() {
    let Some(pool) = test_db().await else { return };
    let table = create_clients_table(&pool).await;
    let app = app(pool.clone(), &table);

    let created = app
        .clone()
        .oneshot(request("PUT", "/admin/client", Some(json!({ "client": "acme" }))))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let row = body_json(created).await;
    let id = row["client_id"].as_i64().expect("created row carries its id");

    let found = app
        .clone()
        .oneshot(request("GET", &format!("/admin/client/{}", id), None))
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    let body = body_json(found).await;
    assert_eq!(body["client"], "acme");
    assert_eq!(body["client_id"], json!(id));

    let missing = app
        .oneshot(request("GET", "/admin/client/999999", None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);
    let body = body_json(missing).await;
    assert_eq!(body["error"], "Client was not Found");

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn post_inserts_when_absent_then_updates_when_present() {
    let Some(pool) = test_db().await else { return };
    let table = create_clients_table(&pool).await;
    let app = app(pool.clone(), &table);

    let first = app
        .clone()
        .oneshot(request(
            "POST",
            "/admin/client",
            Some(json!({ "client_id": 7001, "client": "first" })),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .clone()
        .oneshot(request(
            "POST",
            "/admin/client",
            Some(json!({ "client_id": 7001, "client": "renamed" })),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::ACCEPTED);
    let row = body_json(second).await;
    assert_eq!(row["client_id"], json!(7001));
    assert_eq!(row["client"], "renamed");

    // still one record, updated in place
    let check = app
        .oneshot(request("GET", "/admin/client/7001", None))
        .await
        .unwrap();
    assert_eq!(check.status(), StatusCode::OK);
    let body = body_json(check).await;
    assert_eq!(body["client"], "renamed");

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn delete_missing_record_is_204_and_existing_is_202() {
    let Some(pool) = test_db().await else { return };
    let table = create_clients_table(&pool).await;
    let app = app(pool.clone(), &table);

    let missing = app
        .clone()
        .oneshot(request("DELETE", "/admin/client/999999", None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        missing.headers().get("x-error").unwrap(),
        "Client was not Found"
    );
    let bytes = axum::body::to_bytes(missing.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());

    let created = app
        .clone()
        .oneshot(request("PUT", "/admin/client", Some(json!({ "client": "gone" }))))
        .await
        .unwrap();
    let id = body_json(created).await["client_id"].as_i64().unwrap();

    let deleted = app
        .clone()
        .oneshot(request("DELETE", &format!("/admin/client/{}", id), None))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::ACCEPTED);
    let row = body_json(deleted).await;
    assert_eq!(row["client"], "gone");

    let check = app
        .oneshot(request("GET", &format!("/admin/client/{}", id), None))
        .await
        .unwrap();
    assert_eq!(check.status(), StatusCode::FORBIDDEN);

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn patch_applies_only_schema_fields() {
    let Some(pool) = test_db().await else { return };
    let table = create_clients_table(&pool).await;
    let app = app(pool.clone(), &table);

    let created = app
        .clone()
        .oneshot(request("PUT", "/admin/client", Some(json!({ "client": "patched" }))))
        .await
        .unwrap();
    let id = body_json(created).await["client_id"].as_i64().unwrap();

    let patched = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/admin/client/{}", id),
            Some(json!({ "description": "updated", "bogus": "ignored" })),
        ))
        .await
        .unwrap();
    assert_eq!(patched.status(), StatusCode::ACCEPTED);
    let row = body_json(patched).await;
    assert_eq!(row["description"], "updated");
    assert_eq!(row["client"], "patched");
    assert!(row.get("bogus").is_none());

    let miss = app
        .oneshot(request(
            "PATCH",
            "/admin/client/999999",
            Some(json!({ "description": "nobody" })),
        ))
        .await
        .unwrap();
    assert_eq!(miss.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        miss.headers().get("x-error").unwrap(),
        "Client was not Found"
    );

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn put_duplicate_unique_value_is_412() {
    let Some(pool) = test_db().await else { return };
    let table = create_clients_table(&pool).await;
    let app = app(pool.clone(), &table);

    let first = app
        .clone()
        .oneshot(request("PUT", "/admin/client", Some(json!({ "client": "dup" }))))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(request("PUT", "/admin/client", Some(json!({ "client": "dup" }))))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::PRECONDITION_FAILED);
    let body = body_json(second).await;
    assert_eq!(body["error"], "Record already exists for Client");
    assert!(body["payload"].is_string());

    drop_table(&pool, &table).await;
}
