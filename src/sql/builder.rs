//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a model binding.
//!
//! All WHERE clauses take the resolved key as an ordered field/value list, so
//! scalar and composite primary keys go through the same path.

use crate::binding::ModelBinding;
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from registration config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(binding: &ModelBinding) -> String {
    format!(
        "{}.{}",
        quoted(&binding.schema_name),
        quoted(&binding.table_name)
    )
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT column list from the schema descriptor.
fn column_list(binding: &ModelBinding) -> String {
    binding
        .schema
        .fields
        .iter()
        .map(|f| quoted(&f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Placeholder for one bound value, with a cast when the column type needs it.
fn placeholder(binding: &ModelBinding, field: &str, n: usize) -> String {
    binding
        .schema
        .field(field)
        .and_then(|f| f.field_type.pg_cast())
        .map(|t| format!("${}::{}", n, t))
        .unwrap_or_else(|| format!("${}", n))
}

/// WHERE clause over the resolved key fields, in order.
fn key_clause(q: &mut QueryBuf, binding: &ModelBinding, key: &[(String, Value)]) -> String {
    key.iter()
        .map(|(field, value)| {
            let n = q.push_param(value.clone());
            format!("{} = {}", quoted(field), placeholder(binding, field, n))
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// SELECT the full collection, ordered by the PK fields.
pub fn select_all(binding: &ModelBinding) -> QueryBuf {
    let mut q = QueryBuf::new();
    let order = binding
        .pk
        .fields()
        .iter()
        .map(|f| quoted(f))
        .collect::<Vec<_>>()
        .join(", ");
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        column_list(binding),
        qualified_table(binding),
        order
    );
    q
}

/// SELECT one row by resolved key.
pub fn select_by_key(binding: &ModelBinding, key: &[(String, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = key_clause(&mut q, binding, key);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {}",
        column_list(binding),
        qualified_table(binding),
        where_clause
    );
    q
}

/// INSERT from body: only schema columns; columns with a DB default are
/// omitted when the body does not provide a value. Returns the created row.
pub fn insert(binding: &ModelBinding, body: &serde_json::Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for f in &binding.schema.fields {
        let val = body.get(&f.name).cloned();
        if val.is_none() && f.has_default {
            continue;
        }
        let n = q.push_param(val.unwrap_or(Value::Null));
        cols.push(quoted(&f.name));
        placeholders.push(placeholder(binding, &f.name, n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(binding),
        cols.join(", "),
        placeholders.join(", "),
        column_list(binding)
    );
    q
}

/// UPDATE by resolved key: SET only body fields present in the schema and
/// not part of the key. Returns the updated row.
pub fn update_by_key(
    binding: &ModelBinding,
    key: &[(String, Value)],
    body: &serde_json::Map<String, Value>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let key_fields: Vec<&str> = key.iter().map(|(f, _)| f.as_str()).collect();
    let mut sets = Vec::new();
    for f in &binding.schema.fields {
        if key_fields.contains(&f.name.as_str()) {
            continue;
        }
        let Some(v) = body.get(&f.name) else { continue };
        let n = q.push_param(v.clone());
        sets.push(format!(
            "{} = {}",
            quoted(&f.name),
            placeholder(binding, &f.name, n)
        ));
    }
    if sets.is_empty() {
        // nothing to change; re-read the row so update still returns it
        return select_by_key(binding, key);
    }
    let set_clause = sets.join(", ");
    let where_clause = key_clause(&mut q, binding, key);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} RETURNING {}",
        qualified_table(binding),
        set_clause,
        where_clause,
        column_list(binding)
    );
    q
}

/// DELETE by resolved key, returning the deleted row.
pub fn delete_by_key(binding: &ModelBinding, key: &[(String, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = key_clause(&mut q, binding, key);
    q.sql = format!(
        "DELETE FROM {} WHERE {} RETURNING {}",
        qualified_table(binding),
        where_clause,
        column_list(binding)
    );
    q
}
