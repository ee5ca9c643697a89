//! Admin panel registration: URL prefix, title, and the set of bound models.

use crate::binding::ModelBinding;
use crate::routes::panel_routes;
use crate::session::{AuthBackend, SessionService};
use crate::state::AppState;
use crate::view::ViewRenderer;
use axum::Router;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

/// Index-page entry for one registered model.
#[derive(Clone, Debug, Serialize)]
pub struct PanelRoute {
    pub name: String,
    pub title: String,
    pub icon: String,
    pub path: String,
}

/// Read-only panel configuration shared into handlers.
#[derive(Clone, Debug)]
pub struct PanelInfo {
    pub title: String,
    pub uri_prefix: String,
    pub routes: Vec<PanelRoute>,
}

impl PanelInfo {
    pub fn login_url(&self) -> String {
        format!("{}/login", self.uri_prefix)
    }

    pub fn logout_url(&self) -> String {
        format!("{}/logout", self.uri_prefix)
    }
}

/// Builder for one admin panel instance. Each instance owns its route list
/// and binding registry; nothing is shared between panels.
pub struct AdminPanel {
    title: String,
    uri_prefix: String,
    routes: Vec<PanelRoute>,
    bindings: HashMap<String, Arc<ModelBinding>>,
}

impl AdminPanel {
    pub fn new(title: impl Into<String>) -> Self {
        AdminPanel {
            title: title.into(),
            uri_prefix: "/admin".into(),
            routes: Vec::new(),
            bindings: HashMap::new(),
        }
    }

    /// Change the URL prefix (default `/admin`). Must not be `/`.
    pub fn uri_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.uri_prefix = prefix.into();
        self
    }

    /// Register a model binding. Records the index-page entry and exposes
    /// the resource under `{prefix}/{resource}`.
    pub fn add_model(mut self, binding: ModelBinding) -> Self {
        let route = PanelRoute {
            name: binding.resource.to_lowercase(),
            title: binding.name.clone(),
            icon: binding.icon.clone(),
            path: format!("{}/{}", self.uri_prefix, binding.resource),
        };
        tracing::info!(model = %binding.name, path = %route.path, "registered admin model");
        self.routes.push(route);
        self.bindings
            .insert(binding.resource.clone(), Arc::new(binding));
        self
    }

    pub fn routes(&self) -> &[PanelRoute] {
        &self.routes
    }

    /// Build the axum router with every path under the panel prefix.
    pub fn router(
        self,
        pool: PgPool,
        sessions: Arc<dyn SessionService>,
        backends: HashMap<String, Arc<dyn AuthBackend>>,
        views: Arc<dyn ViewRenderer>,
    ) -> Router {
        let prefix = self.uri_prefix.clone();
        let state = AppState {
            pool,
            sessions,
            backends: Arc::new(backends),
            views,
            panel: Arc::new(PanelInfo {
                title: self.title,
                uri_prefix: self.uri_prefix,
                routes: self.routes,
            }),
            bindings: Arc::new(self.bindings),
        };
        panel_routes(&prefix, state)
    }
}
