//! Route table for one panel instance.
//!
//! All paths are registered with the panel prefix spelled out, so the index
//! lives at the exact prefix. Model routes are parameterized: the handler
//! resolves the binding from the resource segment, and the wildcard id
//! carries `/`-joined values for composite primary keys. Literal panel
//! routes (login, logout) take precedence over the resource capture.

use crate::handlers::{model, panel};
use crate::state::AppState;
use axum::{
    routing::{any, get},
    Router,
};

pub fn panel_routes(prefix: &str, state: AppState) -> Router {
    Router::new()
        .route(prefix, get(panel::index))
        .route(&format!("{}/login", prefix), get(panel::login_form).post(panel::login))
        .route(&format!("{}/logout", prefix), get(panel::logout))
        .route(&format!("{}/:resource", prefix), any(model::collection))
        .route(&format!("{}/:resource/*id", prefix), any(model::item))
        .with_state(state)
}
