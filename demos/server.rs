//! Demo server: binds the auth models (client, organization, program, group,
//! permission) onto an admin panel with an in-memory session store and a
//! basic-auth backend, then serves it.

use admin_sdk::{
    AdminPanel, AuthBackend, BasicViews, FieldDef, FieldType, ModelBinding, ModelSchema,
    PanelError, SessionData, SessionService, UserData,
};
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Bearer-token sessions held in process memory. Good enough for a demo;
/// production wires a real session store behind the same trait.
#[derive(Default)]
struct MemorySessions {
    tokens: RwLock<HashMap<String, Vec<String>>>,
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.to_string())
}

#[async_trait]
impl SessionService for MemorySessions {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<SessionData>, PanelError> {
        let Some(token) = bearer(headers) else {
            return Ok(None);
        };
        let tokens = self
            .tokens
            .read()
            .map_err(|_| PanelError::Internal("session store poisoned".into()))?;
        Ok(tokens
            .get(&token)
            .map(|groups| SessionData::from_groups(groups.clone())))
    }

    async fn load_session(&self, user: &UserData) -> Result<(), PanelError> {
        let groups = user
            .user
            .get("groups")
            .and_then(|g| g.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_else(|| vec!["superuser".to_string()]);
        self.tokens
            .write()
            .map_err(|_| PanelError::Internal("session store poisoned".into()))?
            .insert(user.token.clone(), groups);
        Ok(())
    }

    async fn forget(&self, headers: &HeaderMap) -> Result<(), PanelError> {
        if let Some(token) = bearer(headers) {
            self.tokens
                .write()
                .map_err(|_| PanelError::Internal("session store poisoned".into()))?
                .remove(&token);
        }
        Ok(())
    }
}

/// Username/password check against env vars, minting a fresh token.
struct BasicAuth;

#[async_trait]
impl AuthBackend for BasicAuth {
    async fn authenticate(
        &self,
        _headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Option<UserData>, PanelError> {
        let creds: serde_json::Value = serde_json::from_slice(body)
            .map_err(|_| PanelError::InvalidData("Invalid login Data".into()))?;
        let username = creds.get("username").and_then(|v| v.as_str()).unwrap_or("");
        let password = creds.get("password").and_then(|v| v.as_str()).unwrap_or("");
        let expected_user = std::env::var("ADMIN_USER").unwrap_or_else(|_| "admin".into());
        let expected_pass = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".into());
        if username != expected_user || password != expected_pass {
            return Ok(None);
        }
        Ok(Some(UserData {
            token: uuid::Uuid::new_v4().to_string(),
            user: json!({ "username": username, "groups": ["superuser"] }),
        }))
    }
}

fn client_binding() -> ModelBinding {
    ModelBinding::new(
        "Client",
        "client",
        "clients",
        ModelSchema::new(vec![
            FieldDef::new("client_id", FieldType::BigInt).with_default(),
            FieldDef::new("client", FieldType::Text),
            FieldDef::new("description", FieldType::Text).nullable(),
            FieldDef::new("enabled", FieldType::Boolean).with_default(),
            FieldDef::new("created_at", FieldType::Timestamp).with_default(),
        ]),
    )
    .icon("codesandbox")
    .pk("client_id")
}

fn org_binding() -> ModelBinding {
    ModelBinding::new(
        "Organization",
        "organization",
        "organizations",
        ModelSchema::new(vec![
            FieldDef::new("org_id", FieldType::BigInt).with_default(),
            FieldDef::new("organization", FieldType::Text),
            FieldDef::new("enabled", FieldType::Boolean).with_default(),
        ]),
    )
    .icon("globe")
    .pk("org_id")
}

fn program_binding() -> ModelBinding {
    ModelBinding::new(
        "Program",
        "program",
        "programs",
        ModelSchema::new(vec![
            FieldDef::new("org_id", FieldType::BigInt),
            FieldDef::new("program_id", FieldType::BigInt),
            FieldDef::new("program_name", FieldType::Text),
            FieldDef::new("description", FieldType::Text).nullable(),
        ]),
    )
    .icon("grid")
    .composite_pk(vec!["org_id".into(), "program_id".into()])
}

fn group_binding() -> ModelBinding {
    ModelBinding::new(
        "Group",
        "group",
        "groups",
        ModelSchema::new(vec![
            FieldDef::new("group_id", FieldType::BigInt).with_default(),
            FieldDef::new("group_name", FieldType::Text),
        ]),
    )
    .icon("users")
    .pk("group_id")
}

fn permission_binding() -> ModelBinding {
    ModelBinding::new(
        "Permission",
        "permission",
        "permissions",
        ModelSchema::new(vec![
            FieldDef::new("permission_id", FieldType::BigInt).with_default(),
            FieldDef::new("permission", FieldType::Text),
            FieldDef::new("enabled", FieldType::Boolean).with_default(),
        ]),
    )
    .icon("layers")
    .pk("permission_id")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("admin_sdk=info".parse()?))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/admin".into());
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let panel = AdminPanel::new("Admin Panel")
        .add_model(client_binding())
        .add_model(org_binding())
        .add_model(program_binding())
        .add_model(group_binding())
        .add_model(permission_binding());

    let mut backends: HashMap<String, Arc<dyn AuthBackend>> = HashMap::new();
    backends.insert("BasicAuth".into(), Arc::new(BasicAuth));

    let app = panel
        .router(
            pool,
            Arc::new(MemorySessions::default()),
            backends,
            Arc::new(BasicViews),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
