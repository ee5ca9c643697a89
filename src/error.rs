//! Typed errors and HTTP mapping.
//!
//! Every failure the panel can produce maps to a fixed status code and an
//! `{error, payload}` JSON body. Authorization and capability failures carry
//! no payload; validation and key-count failures embed the offending data.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Access Denied")]
    Unauthorized,
    #[error("{0}")]
    MethodNotAllowed(String),
    /// Composite PK with a path segment count that does not match the field list.
    #[error("Invalid Number of URL elements for PK: {expected:?}, {supplied:?}")]
    InvalidKeyCount {
        expected: Vec<String>,
        supplied: Vec<String>,
    },
    /// Unservable binding configuration. The builder API cannot produce one;
    /// registrations sourced from external configuration can.
    #[error("{0}")]
    InvalidConfiguration(String),
    #[error("{message}")]
    Validation { message: String, payload: Value },
    #[error("{message}")]
    AlreadyExists { message: String, payload: Value },
    /// Single-record lookup miss. Maps to 403 with "<Name> was not Found";
    /// PATCH and DELETE intercept it and answer 204 instead.
    #[error("{0} was not Found")]
    NotFound(String),
    #[error("{0}")]
    InvalidData(String),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("Database Error")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl PanelError {
    fn status(&self) -> StatusCode {
        match self {
            PanelError::Unauthorized => StatusCode::FORBIDDEN,
            PanelError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            PanelError::InvalidKeyCount { .. } => StatusCode::GONE,
            PanelError::InvalidConfiguration(_) => StatusCode::GONE,
            PanelError::Validation { .. } => StatusCode::NOT_ACCEPTABLE,
            PanelError::AlreadyExists { .. } => StatusCode::PRECONDITION_FAILED,
            PanelError::NotFound(_) => StatusCode::FORBIDDEN,
            PanelError::InvalidData(_) => StatusCode::FORBIDDEN,
            PanelError::UnknownResource(_) => StatusCode::NOT_FOUND,
            PanelError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PanelError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn payload(&self) -> Option<Value> {
        match self {
            PanelError::InvalidKeyCount { expected, supplied } => Some(json!({
                "expected": expected,
                "supplied": supplied,
            })),
            PanelError::Validation { payload, .. } => Some(payload.clone()),
            PanelError::AlreadyExists { payload, .. } => Some(payload.clone()),
            PanelError::Db(e) => Some(Value::String(e.to_string())),
            _ => None,
        }
    }
}

/// `{error, payload}` body shared by all error responses.
pub fn error_body(error: &str, payload: Option<Value>) -> Value {
    match payload {
        Some(p) => json!({ "error": error, "payload": p }),
        None => json!({ "error": error }),
    }
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = error_body(&self.to_string(), self.payload());
        (status, Json(body)).into_response()
    }
}
