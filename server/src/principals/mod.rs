//! Principal Directory
//!
//! Users, groups and system roles that resources can be shared with, plus
//! people-picker search and Entra ID group sync.

pub mod directory;
pub mod error;
pub mod handlers;
pub mod search;

use axum::routing::{get, post};
use axum::Router;

use crate::api::AppState;

pub use directory::{Directory, DirectoryGroup, DirectorySeed, DirectoryUser, EntraGroup};
pub use error::PrincipalError;

/// Principal search route.
///
/// Mounted at `/api/permissions` next to the ACL routes.
pub fn search_router() -> Router<AppState> {
    Router::new().route("/search-principals", get(handlers::search_principals))
}

/// Directory maintenance routes.
///
/// Mounted at `/api/principals` in the main router.
pub fn router() -> Router<AppState> {
    Router::new().route("/entra-sync", post(handlers::sync_entra_groups))
}
