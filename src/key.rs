//! Primary-key resolution from request body and URL path.
//!
//! Shared by every verb. A request may legitimately resolve no key at all
//! (collection-level GET, keyless POST insert); that outcome is an explicit
//! state, not an error, and each verb decides what to do with it.

use crate::binding::{FieldType, ModelBinding, PkDescriptor};
use crate::error::PanelError;
use serde_json::{Map, Value};

/// Outcome of key resolution: either nothing was supplied, or an ordered
/// field/value list matching the binding's PK descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedKey {
    None,
    Key(Vec<(String, Value)>),
}

impl ResolvedKey {
    pub fn is_none(&self) -> bool {
        matches!(self, ResolvedKey::None)
    }
}

/// Resolve the primary key for one request.
///
/// Scalar PK: the body field wins, then the path id. Missing from both is
/// "no key resolved". Composite PK: the path id is split on `/` and must
/// match the field list length exactly; a missing path id falls through to
/// "no key resolved" (matching the collection-level behavior of reads).
pub fn resolve_key(
    binding: &ModelBinding,
    body: Option<&Map<String, Value>>,
    path_id: Option<&str>,
) -> Result<ResolvedKey, PanelError> {
    match &binding.pk {
        PkDescriptor::Scalar(field) => {
            if let Some(v) = body.and_then(|b| b.get(field)) {
                if !v.is_null() {
                    return Ok(ResolvedKey::Key(vec![(field.clone(), v.clone())]));
                }
            }
            match path_id {
                Some(id) if !id.is_empty() => Ok(ResolvedKey::Key(vec![(
                    field.clone(),
                    coerce_segment(binding, field, id),
                )])),
                _ => Ok(ResolvedKey::None),
            }
        }
        PkDescriptor::Composite(fields) => {
            let Some(id) = path_id else {
                return Ok(ResolvedKey::None);
            };
            let segments: Vec<&str> = id.split('/').collect();
            if segments.len() != fields.len() {
                return Err(PanelError::InvalidKeyCount {
                    expected: fields.clone(),
                    supplied: segments.iter().map(|s| s.to_string()).collect(),
                });
            }
            let key = fields
                .iter()
                .zip(segments)
                .map(|(f, s)| (f.clone(), coerce_segment(binding, f, s)))
                .collect();
            Ok(ResolvedKey::Key(key))
        }
    }
}

/// Coerce a path segment per the schema's column type. Lenient: a segment
/// that does not parse stays a string and the database reports the mismatch.
fn coerce_segment(binding: &ModelBinding, field: &str, segment: &str) -> Value {
    match binding.schema.field(field).map(|f| f.field_type) {
        Some(FieldType::Integer) | Some(FieldType::BigInt) => segment
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(segment.to_string())),
        Some(FieldType::Boolean) => match segment {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(segment.to_string()),
        },
        _ => Value::String(segment.to_string()),
    }
}
