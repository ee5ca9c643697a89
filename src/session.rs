//! Session service seam and group-based authorization.
//!
//! The panel never talks to a session store directly: an injected
//! [`SessionService`] resolves the caller's session from request headers and
//! manages login/logout. Session payloads come in two shapes in the wild, a
//! flat group list on a session-embedded user-info object, or a decoded user
//! object carrying group records; both are modeled explicitly.

use crate::error::PanelError;
use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::Value;

/// Group record on a decoded user object.
#[derive(Clone, Debug, Deserialize)]
pub struct GroupRef {
    pub group: String,
}

/// Decoded user object with group records.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthUser {
    pub username: String,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

/// The two session payload representations the panel accepts.
#[derive(Clone, Debug)]
pub enum SessionPayload {
    /// Flat group list on the session's user-info object.
    UserInfo { groups: Vec<String> },
    /// Full user object; groups are records with a `group` name.
    User(AuthUser),
}

/// Per-request authenticated session.
#[derive(Clone, Debug)]
pub struct SessionData {
    pub payload: SessionPayload,
}

impl SessionData {
    pub fn from_groups(groups: Vec<String>) -> Self {
        SessionData {
            payload: SessionPayload::UserInfo { groups },
        }
    }

    pub fn from_user(user: AuthUser) -> Self {
        SessionData {
            payload: SessionPayload::User(user),
        }
    }

    /// Membership test: non-empty intersection between the caller's groups
    /// and the allowed set.
    pub fn is_member_of(&self, allowed: &[String]) -> bool {
        match &self.payload {
            SessionPayload::UserInfo { groups } => {
                groups.iter().any(|g| allowed.iter().any(|a| a == g))
            }
            SessionPayload::User(user) => user
                .groups
                .iter()
                .any(|g| allowed.iter().any(|a| *a == g.group)),
        }
    }
}

/// Authenticated user data handed back by an [`AuthBackend`] on login.
#[derive(Clone, Debug)]
pub struct UserData {
    pub token: String,
    pub user: Value,
}

/// External session store: resolve, persist, forget.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Resolve the current session from request headers. `Ok(None)` means
    /// no session; decoding failures are errors.
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<SessionData>, PanelError>;

    /// Persist a fresh session after login.
    async fn load_session(&self, user: &UserData) -> Result<(), PanelError>;

    /// Drop the caller's session.
    async fn forget(&self, headers: &HeaderMap) -> Result<(), PanelError>;
}

/// External authentication backend, selected per-request by the
/// `x-auth-method` header on login.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Authenticate from headers and form/JSON body. `Ok(None)` means bad
    /// credentials; unknown-user conditions surface as `Unauthorized`.
    async fn authenticate(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Option<UserData>, PanelError>;
}

/// Authorization gate shared by every model operation: no session, an
/// undecodable session, or an empty group intersection all deny access.
pub fn authorize(
    session: Option<&SessionData>,
    allowed_groups: &[String],
) -> Result<(), PanelError> {
    match session {
        Some(s) if s.is_member_of(allowed_groups) => Ok(()),
        _ => Err(PanelError::Unauthorized),
    }
}
