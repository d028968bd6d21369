//! Messages
//!
//! Feedback validation, the feedback tag catalogue, and reply-tree assembly.

pub mod error;
pub mod handlers;
pub mod types;

use axum::routing::{get, post};
use axum::Router;

use crate::api::AppState;

pub use error::MessageError;

/// Create the message router.
///
/// Mounted at `/api/messages`; every route requires auth.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feedback/validate", post(handlers::validate_feedback))
        .route("/feedback/tags", get(handlers::list_feedback_tags))
        .route("/tree", post(handlers::build_message_tree))
}
