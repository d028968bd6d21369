//! Conversation Parsing
//!
//! Endpoint-aware option parsing, conversation validation, and response
//! sender naming.

pub mod error;
pub mod handlers;
pub mod types;

use axum::routing::post;
use axum::Router;

use crate::api::AppState;

pub use error::ConvoError;

/// Create the conversation router.
///
/// Mounted at `/api/convos`; every route requires auth.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/parse", post(handlers::parse_conversation))
        .route("/validate", post(handlers::validate_conversation))
        .route("/sender", post(handlers::response_sender))
}
