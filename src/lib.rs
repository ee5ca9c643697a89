//! Admin SDK: model-driven admin panel backend library.
//!
//! Register table-backed model bindings on an [`AdminPanel`] and mount the
//! resulting router: each resource gets list/get/create/update/delete and
//! schema introspection endpoints gated by group-based session auth, plus
//! login/index/listing HTML pages.

pub mod binding;
pub mod error;
pub mod handlers;
pub mod key;
pub mod panel;
pub mod response;
pub mod routes;
pub mod service;
pub mod session;
pub mod sql;
pub mod state;
pub mod view;

pub use binding::{FieldDef, FieldType, ModelBinding, ModelSchema, PkDescriptor};
pub use error::PanelError;
pub use key::{resolve_key, ResolvedKey};
pub use panel::{AdminPanel, PanelInfo, PanelRoute};
pub use service::CrudService;
pub use session::{
    authorize, AuthBackend, AuthUser, GroupRef, SessionData, SessionPayload, SessionService,
    UserData,
};
pub use state::AppState;
pub use view::{BasicViews, ViewArgs, ViewRenderer};
