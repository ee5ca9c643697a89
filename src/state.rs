//! Shared application state for all panel routes.
//!
//! Everything here is read-only after registration: the binding registry is
//! fixed when the router is built, and the injected services are trait
//! objects behind `Arc`.

use crate::binding::ModelBinding;
use crate::panel::PanelInfo;
use crate::session::{AuthBackend, SessionService};
use crate::view::ViewRenderer;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: Arc<dyn SessionService>,
    /// Login backends keyed by the `x-auth-method` header value.
    pub backends: Arc<HashMap<String, Arc<dyn AuthBackend>>>,
    pub views: Arc<dyn ViewRenderer>,
    pub panel: Arc<PanelInfo>,
    /// Registered model bindings keyed by resource segment.
    pub bindings: Arc<HashMap<String, Arc<ModelBinding>>>,
}

impl AppState {
    pub fn binding(&self, resource: &str) -> Option<Arc<ModelBinding>> {
        self.bindings.get(resource).cloned()
    }
}
