//! Body validation against the registration-time schema descriptor.

use crate::binding::ModelBinding;
use crate::error::PanelError;
use serde_json::{json, Map, Value};

/// Validate a body about to be inserted: every field must exist in the
/// schema, non-nullable columns without a DB default must be present, and
/// primitive types must agree. Failures carry a per-field payload.
pub fn validate_insert(
    binding: &ModelBinding,
    body: &Map<String, Value>,
) -> Result<(), PanelError> {
    let mut problems = Map::new();

    for (name, value) in body {
        match binding.schema.field(name) {
            None => {
                problems.insert(name.clone(), json!("unknown field"));
            }
            Some(f) => {
                if value.is_null() {
                    if !f.nullable {
                        problems.insert(name.clone(), json!("null not allowed"));
                    }
                } else if !f.field_type.accepts(value) {
                    problems.insert(
                        name.clone(),
                        json!(format!(
                            "expected {}, got {}",
                            f.field_type.json_type(),
                            json_type_name(value)
                        )),
                    );
                }
            }
        }
    }

    for f in &binding.schema.fields {
        if !f.nullable && !f.has_default && !body.contains_key(&f.name) {
            problems.insert(f.name.clone(), json!("missing required field"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(PanelError::Validation {
            message: format!("Unable to insert {} info", binding.name),
            payload: Value::Object(problems),
        })
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
