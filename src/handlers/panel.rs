//! Panel pages: index, login, logout.
//!
//! Authentication itself is a collaborator: the login POST picks an
//! [`crate::session::AuthBackend`] by the `x-auth-method` header and stores
//! the resulting session through the injected session service.

use crate::error::{error_body, PanelError};
use crate::state::AppState;
use crate::view::ViewArgs;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};

const DEFAULT_AUTH_METHOD: &str = "BasicAuth";

/// `GET {prefix}`: redirect to login without a session, else the index view
/// listing every registered model.
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PanelError> {
    let login_url = state.panel.login_url();
    let session = match state.sessions.get_session(&headers).await {
        Ok(s) => s,
        Err(_) => None,
    };
    if session.is_none() {
        return Ok(Redirect::to(&login_url).into_response());
    }
    let args = ViewArgs {
        title: state.panel.title.clone(),
        main_url: state.panel.uri_prefix.clone(),
        logout_url: Some(state.panel.logout_url()),
        auth_method: None,
        admin_routes: state.panel.routes.clone(),
    };
    Ok(state.views.view("index", &args)?.into_response())
}

/// `GET {prefix}/login`: render the login view.
pub async fn login_form(State(state): State<AppState>) -> Result<Response, PanelError> {
    let args = ViewArgs {
        title: state.panel.title.clone(),
        main_url: state.panel.uri_prefix.clone(),
        logout_url: None,
        auth_method: Some(DEFAULT_AUTH_METHOD.into()),
        admin_routes: Vec::new(),
    };
    Ok(state.views.view("login", &args)?.into_response())
}

/// `POST {prefix}/login`: authenticate through the selected backend, store
/// the session, redirect to the index with a bearer token header.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, PanelError> {
    let method = headers
        .get("x-auth-method")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_AUTH_METHOD);
    let Some(backend) = state.backends.get(method) else {
        tracing::warn!(method, "login with unknown auth backend");
        let body = error_body(&format!("{} Backend Auth is not enabled.", method), None);
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    };
    match backend.authenticate(&headers, &body).await? {
        Some(user) => {
            state.sessions.load_session(&user).await?;
            let mut resp_headers = HeaderMap::new();
            resp_headers.insert(
                header::LOCATION,
                HeaderValue::from_str(&state.panel.uri_prefix)
                    .map_err(|_| PanelError::Internal("invalid panel prefix".into()))?,
            );
            if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", user.token)) {
                resp_headers.insert(header::AUTHORIZATION, v);
            }
            Ok((StatusCode::FOUND, resp_headers, ()).into_response())
        }
        None => {
            let body = error_body("Unauthorized: Access Denied to this resource.", None);
            Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response())
        }
    }
}

/// `GET {prefix}/logout`: forget the session, back to login.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PanelError> {
    state.sessions.forget(&headers).await?;
    Ok(Redirect::to(&state.panel.login_url()).into_response())
}
