//! Generic CRUD execution against PostgreSQL.
//!
//! Every operation checks out one pooled connection for its duration; the
//! checkout is dropped on all exit paths. Storage errors are translated here
//! and never leaked raw: unique-constraint violations become
//! `AlreadyExists`, everything else surfaces as `Db`.

use crate::binding::ModelBinding;
use crate::error::PanelError;
use crate::sql::{self, PgBindValue};
use serde_json::{json, Map, Value};
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

pub struct CrudService;

impl CrudService {
    /// Fetch the full collection, ordered by PK.
    pub async fn all(pool: &PgPool, binding: &ModelBinding) -> Result<Vec<Value>, PanelError> {
        let q = sql::select_all(binding);
        let mut conn = acquire(pool).await?;
        tracing::debug!(sql = %q.sql, "select all");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Fetch one row by resolved key. `Ok(None)` when absent.
    pub async fn get(
        pool: &PgPool,
        binding: &ModelBinding,
        key: &[(String, Value)],
    ) -> Result<Option<Value>, PanelError> {
        let q = sql::select_by_key(binding, key);
        let mut conn = acquire(pool).await?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "select by key");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    /// Insert one row from body data; returns the created row. A
    /// unique-constraint violation maps to `AlreadyExists`.
    pub async fn insert(
        pool: &PgPool,
        binding: &ModelBinding,
        body: &Map<String, Value>,
    ) -> Result<Value, PanelError> {
        let q = sql::insert(binding, body);
        let mut conn = acquire(pool).await?;
        tracing::debug!(sql = %q.sql, "insert");
        let row = match bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_one(&mut *conn)
            .await
        {
            Ok(row) => row,
            Err(e) => return Err(translate_insert_error(binding, e)),
        };
        Ok(row_to_json(&row))
    }

    /// Update one row by resolved key; SETs only body fields known to the
    /// schema. `Ok(None)` when the row vanished between fetch and update.
    pub async fn update(
        pool: &PgPool,
        binding: &ModelBinding,
        key: &[(String, Value)],
        body: &Map<String, Value>,
    ) -> Result<Option<Value>, PanelError> {
        let q = sql::update_by_key(binding, key, body);
        let mut conn = acquire(pool).await?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "update by key");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    /// Delete one row by resolved key, returning the deleted row.
    pub async fn delete(
        pool: &PgPool,
        binding: &ModelBinding,
        key: &[(String, Value)],
    ) -> Result<Option<Value>, PanelError> {
        let q = sql::delete_by_key(binding, key);
        let mut conn = acquire(pool).await?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "delete by key");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

async fn acquire(pool: &PgPool) -> Result<PoolConnection<Postgres>, PanelError> {
    Ok(pool.acquire().await?)
}

type PgQuery<'q> =
    sqlx::query::Query<'q, Postgres, <Postgres as sqlx::Database>::Arguments<'q>>;

fn bind_all<'q>(mut query: PgQuery<'q>, params: &'q [Value]) -> PgQuery<'q> {
    for p in params {
        query = query.bind(PgBindValue::from_json(p));
    }
    query
}

fn translate_insert_error(binding: &ModelBinding, e: sqlx::Error) -> PanelError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return PanelError::AlreadyExists {
                message: format!("Record already exists for {}", binding.name),
                payload: json!(db.to_string()),
            };
        }
    }
    PanelError::Db(e)
}

/// Decode a database row into a JSON object, column by column.
pub fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(num) = serde_json::Number::from_f64(n) {
            return Value::Number(num);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}
