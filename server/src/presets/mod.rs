//! User Presets API
//!
//! Saved bundles of conversation options, per user.

pub mod store;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use lc_common::convo::Preset;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::extract::JsonBody;
use crate::api::AppState;
use crate::auth::AuthUser;

pub use store::PresetStore;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletePresetsRequest {
    /// Preset to delete; all of the caller's presets when absent.
    #[serde(default)]
    pub preset_id: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletePresetsResponse {
    pub deleted_count: usize,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error(transparent)]
    Validation(#[from] lc_common::Error),
}

impl IntoResponse for PresetError {
    fn into_response(self) -> axum::response::Response {
        let Self::Validation(e) = &self;
        let body = json!({
            "error": "VALIDATION_ERROR",
            "message": self.to_string(),
            "issues": e.issues(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List the caller's presets.
///
/// GET /api/presets
#[utoipa::path(
    get,
    path = "/api/presets",
    tag = "presets",
    responses((status = 200, description = "Presets in listing order", body = Vec<Object>)),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn list_presets(State(state): State<AppState>, auth_user: AuthUser) -> Json<Vec<Preset>> {
    Json(state.presets.list(&auth_user.id))
}

/// Create or replace a preset.
///
/// POST /api/presets
#[utoipa::path(
    post,
    path = "/api/presets",
    tag = "presets",
    request_body = Object,
    responses(
        (status = 201, description = "Saved preset", body = Object),
        (status = 400, description = "Invalid preset"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, body))]
pub async fn save_preset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<Preset>), PresetError> {
    let preset = Preset::parse(body)?;
    let saved = state.presets.save(&auth_user.id, preset);
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Delete one preset or all of them.
///
/// POST /api/presets/delete
#[utoipa::path(
    post,
    path = "/api/presets/delete",
    tag = "presets",
    request_body = DeletePresetsRequest,
    responses((status = 200, body = DeletePresetsResponse)),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn delete_presets(
    State(state): State<AppState>,
    auth_user: AuthUser,
    JsonBody(request): JsonBody<DeletePresetsRequest>,
) -> Json<DeletePresetsResponse> {
    let deleted_count = state
        .presets
        .delete(&auth_user.id, request.preset_id.as_deref());
    tracing::info!(user_id = %auth_user.id, deleted_count, "Presets deleted");
    Json(DeletePresetsResponse { deleted_count })
}

// ============================================================================
// Router
// ============================================================================

/// Create the preset router.
///
/// Mounted at `/api/presets`; every route requires auth.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_presets).post(save_preset))
        .route("/delete", post(delete_presets))
}
