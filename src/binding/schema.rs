//! Registration-time schema descriptor.
//!
//! Columns are declared when a model is bound, not reflected at runtime. The
//! descriptor drives `:meta` introspection, insert validation, and the field
//! filter applied by PATCH/POST.

use serde_json::{json, Map, Value};

/// Column type as seen by the panel. Controls id coercion, insert
/// validation, and the SQL cast used when binding string values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    BigInt,
    Float,
    Boolean,
    Text,
    Uuid,
    Timestamp,
    Date,
    Json,
}

impl FieldType {
    /// JSON-schema type name for the `:meta` document.
    pub fn json_type(&self) -> &'static str {
        match self {
            FieldType::Integer | FieldType::BigInt => "integer",
            FieldType::Float => "number",
            FieldType::Boolean => "boolean",
            FieldType::Text | FieldType::Uuid | FieldType::Timestamp | FieldType::Date => "string",
            FieldType::Json => "object",
        }
    }

    /// PostgreSQL cast applied to the bind placeholder, where the wire value
    /// is a string that the driver cannot infer (e.g. `$1::uuid`).
    pub fn pg_cast(&self) -> Option<&'static str> {
        match self {
            FieldType::Uuid => Some("uuid"),
            FieldType::Timestamp => Some("timestamptz"),
            FieldType::Date => Some("date"),
            FieldType::Json => Some("jsonb"),
            _ => None,
        }
    }

    /// Whether a JSON value agrees with this column type. Lenient on
    /// string-shaped types; the database has the final word.
    pub fn accepts(&self, v: &Value) -> bool {
        match self {
            FieldType::Integer | FieldType::BigInt => v.is_i64() || v.is_u64(),
            FieldType::Float => v.is_number(),
            FieldType::Boolean => v.is_boolean(),
            FieldType::Text | FieldType::Uuid | FieldType::Timestamp | FieldType::Date => {
                v.is_string()
            }
            FieldType::Json => true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    /// Column has a DB default (serial, gen_random_uuid(), NOW(), ...).
    pub has_default: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDef {
            name: name.into(),
            field_type,
            nullable: false,
            has_default: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// Ordered field list for one bound model.
#[derive(Clone, Debug, Default)]
pub struct ModelSchema {
    pub fields: Vec<FieldDef>,
}

impl ModelSchema {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        ModelSchema { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// JSON-schema-shaped document served by `GET <resource>:meta`.
    pub fn json_schema(&self, title: &str, table: &str, db_schema: &str) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for f in &self.fields {
            properties.insert(
                f.name.clone(),
                json!({
                    "type": f.field_type.json_type(),
                    "nullable": f.nullable,
                    "default": f.has_default,
                }),
            );
            if !f.nullable && !f.has_default {
                required.push(Value::String(f.name.clone()));
            }
        }
        json!({
            "title": title,
            "table": table,
            "schema": db_schema,
            "type": "object",
            "properties": Value::Object(properties),
            "required": Value::Array(required),
        })
    }
}
