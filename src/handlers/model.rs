//! Generic model request handler.
//!
//! One dispatcher per registered resource: authenticate, resolve the primary
//! key from path or body, run exactly one CRUD operation, serialize the
//! result. All verbs share the control pattern; the table of verb semantics
//! lives with each operation below.

use crate::binding::ModelBinding;
use crate::error::PanelError;
use crate::key::{resolve_key, ResolvedKey};
use crate::response::{json_response, no_content, schema_headers, x_error_header};
use crate::service::{validate_insert, CrudService};
use crate::session::authorize;
use crate::state::AppState;
use crate::view::{pluralize, ViewArgs};
use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

/// `{prefix}/{resource}` and `{prefix}/{resource}:meta`.
pub async fn collection(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, PanelError> {
    handle(state, resource, None, method, headers, query, body).await
}

/// `{prefix}/{resource}/*id`; the wildcard carries `/`-joined composite ids.
pub async fn item(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, PanelError> {
    handle(state, resource, Some(id), method, headers, query, body).await
}

async fn handle(
    state: AppState,
    resource_segment: String,
    path_id: Option<String>,
    method: Method,
    headers: HeaderMap,
    query: Option<String>,
    body: Bytes,
) -> Result<Response, PanelError> {
    let (resource, meta) = split_meta(&resource_segment);
    let binding = state
        .binding(resource)
        .ok_or_else(|| PanelError::UnknownResource(resource.to_string()))?;

    // authorization gate: fail before any key resolution or DB access
    let session = state.sessions.get_session(&headers).await?;
    authorize(session.as_ref(), &binding.allowed_groups)?;

    let path_id = path_id.as_deref();
    match method {
        Method::HEAD => Ok(no_content(schema_headers(&binding)?)),
        Method::GET => get_op(&state, &binding, meta, path_id, query.as_deref(), &body).await,
        Method::PUT => put_op(&state, &binding, &body).await,
        Method::PATCH => patch_op(&state, &binding, meta, path_id, &body).await,
        Method::POST => post_op(&state, &binding, path_id, &body).await,
        Method::DELETE => delete_op(&state, &binding, path_id, &body).await,
        other => Err(PanelError::MethodNotAllowed(format!(
            "{} is not supported.",
            other
        ))),
    }
}

/// Split a trailing `:meta` marker off the resource segment.
fn split_meta(segment: &str) -> (&str, bool) {
    match segment.strip_suffix(":meta") {
        Some(r) => (r, true),
        None => (segment, false),
    }
}

/// Parse an optional JSON object body. Empty body is `None`; anything
/// non-empty must be a JSON object.
fn parse_body(body: &Bytes) -> Result<Option<Map<String, Value>>, PanelError> {
    if body.is_empty() {
        return Ok(None);
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(m)) => Ok(Some(m)),
        _ => Err(PanelError::InvalidData("body must be a JSON object".into())),
    }
}

fn require_body(body: &Bytes, name: &str) -> Result<Map<String, Value>, PanelError> {
    parse_body(body)
        .ok()
        .flatten()
        .ok_or_else(|| PanelError::InvalidData(format!("Invalid {} Data", name)))
}

/// GET: `:meta` returns the JSON schema; a resolved key fetches one record;
/// otherwise the collection, as HTML when the bare path carries no query.
async fn get_op(
    state: &AppState,
    binding: &ModelBinding,
    meta: bool,
    path_id: Option<&str>,
    query: Option<&str>,
    body: &Bytes,
) -> Result<Response, PanelError> {
    if meta {
        return Ok(json_response(binding.json_schema(), StatusCode::OK));
    }
    // GET may carry a key in the body; a malformed body is ignored here
    let data = parse_body(body).unwrap_or(None);
    match resolve_key(binding, data.as_ref(), path_id)? {
        ResolvedKey::Key(key) => match CrudService::get(&state.pool, binding, &key).await? {
            Some(row) => Ok(json_response(row, StatusCode::OK)),
            None => Err(PanelError::NotFound(binding.name.clone())),
        },
        ResolvedKey::None => {
            let bare = path_id.is_none() && query.map_or(true, str::is_empty);
            if bare {
                let args = ViewArgs {
                    title: pluralize(&binding.name),
                    main_url: state.panel.uri_prefix.clone(),
                    logout_url: Some(state.panel.logout_url()),
                    auth_method: None,
                    admin_routes: Vec::new(),
                };
                Ok(state.views.view("model", &args)?.into_response())
            } else {
                let rows = CrudService::all(&state.pool, binding).await?;
                Ok(json_response(rows, StatusCode::OK))
            }
        }
    }
}

/// PUT: always an insert from body data.
async fn put_op(
    state: &AppState,
    binding: &ModelBinding,
    body: &Bytes,
) -> Result<Response, PanelError> {
    if !binding.can_create {
        return Err(PanelError::MethodNotAllowed(
            "INSERT options are not allowed.".into(),
        ));
    }
    let data = require_body(body, &binding.name)?;
    validate_insert(binding, &data)?;
    let row = CrudService::insert(&state.pool, binding, &data).await?;
    Ok(json_response(row, StatusCode::CREATED))
}

/// PATCH: partial update of an existing record; `:meta` returns the field
/// names instead.
async fn patch_op(
    state: &AppState,
    binding: &ModelBinding,
    meta: bool,
    path_id: Option<&str>,
    body: &Bytes,
) -> Result<Response, PanelError> {
    if !binding.can_update {
        return Err(PanelError::MethodNotAllowed(
            "UPDATE options are not allowed.".into(),
        ));
    }
    if meta {
        return Ok(json_response(
            binding.schema.field_names(),
            StatusCode::OK,
        ));
    }
    let data = require_body(body, &binding.name)?;
    match resolve_key(binding, Some(&data), path_id)? {
        ResolvedKey::None => Err(PanelError::InvalidData(format!(
            "Invalid {} Data to Patch",
            binding.name
        ))),
        ResolvedKey::Key(key) => {
            if CrudService::get(&state.pool, binding, &key).await?.is_none() {
                let msg = format!("{} was not Found", binding.name);
                return Ok(no_content(x_error_header(&msg)));
            }
            // only body fields known to the schema are applied; the rest
            // are silently ignored
            match CrudService::update(&state.pool, binding, &key, &data).await? {
                Some(row) => Ok(json_response(row, StatusCode::ACCEPTED)),
                None => {
                    let msg = format!("{} was not Found", binding.name);
                    Ok(no_content(x_error_header(&msg)))
                }
            }
        }
    }
}

/// POST: upsert. Insert when no record matches the resolved key (or no key
/// was supplied), update when one does.
async fn post_op(
    state: &AppState,
    binding: &ModelBinding,
    path_id: Option<&str>,
    body: &Bytes,
) -> Result<Response, PanelError> {
    if !binding.can_update || !binding.can_create {
        return Err(PanelError::MethodNotAllowed(
            "UPDATE/INSERT options are not allowed.".into(),
        ));
    }
    let data = require_body(body, &binding.name)?;
    match resolve_key(binding, Some(&data), path_id)? {
        ResolvedKey::Key(key) => {
            match CrudService::get(&state.pool, binding, &key).await? {
                Some(_) => match CrudService::update(&state.pool, binding, &key, &data).await? {
                    Some(row) => Ok(json_response(row, StatusCode::ACCEPTED)),
                    None => {
                        let msg = format!("{} was not Found", binding.name);
                        Ok(no_content(x_error_header(&msg)))
                    }
                },
                None => {
                    validate_insert(binding, &data)?;
                    let row = CrudService::insert(&state.pool, binding, &data).await?;
                    Ok(json_response(row, StatusCode::CREATED))
                }
            }
        }
        ResolvedKey::None => {
            validate_insert(binding, &data)?;
            let row = CrudService::insert(&state.pool, binding, &data).await?;
            Ok(json_response(row, StatusCode::CREATED))
        }
    }
}

/// DELETE: 204 without a key or for a missing record, 202 with the deleted
/// row otherwise.
async fn delete_op(
    state: &AppState,
    binding: &ModelBinding,
    path_id: Option<&str>,
    body: &Bytes,
) -> Result<Response, PanelError> {
    if !binding.can_delete {
        return Err(PanelError::MethodNotAllowed(
            "DELETE options are not allowed.".into(),
        ));
    }
    let data = parse_body(body)
        .map_err(|_| PanelError::InvalidData(format!("Invalid {} Data", binding.name)))?;
    match resolve_key(binding, data.as_ref(), path_id)? {
        ResolvedKey::None => {
            let msg = format!("Cannot Delete an Empty {}", binding.name);
            Ok(no_content(x_error_header(&msg)))
        }
        ResolvedKey::Key(key) => {
            if CrudService::get(&state.pool, binding, &key).await?.is_none() {
                let msg = format!("{} was not Found", binding.name);
                return Ok(no_content(x_error_header(&msg)));
            }
            let deleted = CrudService::delete(&state.pool, binding, &key).await?;
            Ok(json_response(
                deleted.unwrap_or(Value::Null),
                StatusCode::ACCEPTED,
            ))
        }
    }
}
