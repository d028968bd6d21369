//! Authentication Service
//!
//! Validates HS256 access tokens minted by the chat application and resolves
//! the caller against the principal directory.

mod error;
pub mod handlers;
pub mod jwt;
mod middleware;

use axum::{middleware as axum_middleware, routing::get, Router};

use crate::api::AppState;

pub use error::{AuthError, AuthResult, ErrorResponse};
pub use middleware::{require_auth, AuthUser};

/// Create authentication router.
///
/// Protected routes (auth required):
/// - GET /me - Current user and role permissions
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_current_user))
        .layer(axum_middleware::from_fn_with_state(state, require_auth))
}
