//! Response helpers: JSON bodies, no-content with headers, schema introspection headers.

use crate::binding::ModelBinding;
use crate::error::PanelError;
use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

pub fn json_response<T: Serialize>(data: T, status: StatusCode) -> Response {
    (status, Json(data)).into_response()
}

/// 204 with optional extra headers (e.g. `x-error` on a missed PATCH).
pub fn no_content(headers: HeaderMap) -> Response {
    (StatusCode::NO_CONTENT, headers, ()).into_response()
}

pub fn x_error_header(message: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(message) {
        headers.insert(HeaderName::from_static("x-error"), v);
    }
    headers
}

/// Introspection headers for HEAD on a resource: content length of the
/// schema document plus X-Columns, X-Model, X-Tablename, X-Schema.
pub fn schema_headers(binding: &ModelBinding) -> Result<HeaderMap, PanelError> {
    let schema = binding.json_schema();
    let columns = Value::Array(
        binding
            .schema
            .field_names()
            .into_iter()
            .map(|n| Value::String(n.to_string()))
            .collect(),
    );
    let size = schema.to_string().len();

    let mut headers = HeaderMap::new();
    let mut put = |name: &'static str, value: String| -> Result<(), PanelError> {
        let v = HeaderValue::from_str(&value)
            .map_err(|_| PanelError::Internal(format!("invalid header value for {}", name)))?;
        headers.insert(HeaderName::from_static(name), v);
        Ok(())
    };
    put("x-columns", columns.to_string())?;
    put("x-model", binding.name.clone())?;
    put("x-tablename", binding.table_name.clone())?;
    put("x-schema", binding.schema_name.clone())?;
    let len = HeaderValue::from_str(&size.to_string())
        .map_err(|_| PanelError::Internal("invalid content length".into()))?;
    headers.insert(header::CONTENT_LENGTH, len);
    Ok(headers)
}
