//! API Router and Application State
//!
//! Central routing configuration and shared state.

pub mod extract;

use std::sync::Arc;

use axum::{http::HeaderValue, middleware::from_fn_with_state, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    acl::{self, AclStore},
    auth,
    config::Config,
    convos, messages,
    presets::{self, PresetStore},
    principals::{self, Directory},
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Users, groups and role permissions
    pub directory: Arc<Directory>,
    /// Resource ACL entries
    pub acl: Arc<AclStore>,
    /// Saved presets per user
    pub presets: Arc<PresetStore>,
}

impl AppState {
    /// Create new application state with empty ACL and preset stores.
    #[must_use]
    pub fn new(config: Config, directory: Directory) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(directory),
            acl: Arc::new(AclStore::new()),
            presets: Arc::new(PresetStore::new()),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match config.cors_allow_origin.as_deref() {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(origin, "Invalid CORS_ALLOW_ORIGIN, allowing any origin");
                AllowOrigin::any()
            }
        },
        None => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    // Protected routes that require authentication
    let protected_routes = Router::new()
        .nest(
            "/api/permissions",
            acl::router().merge(principals::search_router()),
        )
        .nest("/api/principals", principals::router())
        .nest("/api/convos", convos::router())
        .nest("/api/messages", messages::router())
        .nest("/api/presets", presets::router())
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth routes (pass state for middleware)
        .nest("/auth", auth::router(state.clone()))
        .merge(protected_routes)
        // API documentation
        .merge(api_docs())
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Crate version
    version: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// API documentation
// ============================================================================

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::get_current_user,
        acl::handlers::get_available_roles,
        acl::handlers::list_accessible_resources,
        acl::handlers::get_resource_permissions,
        acl::handlers::update_resource_permissions,
        acl::handlers::get_resource_entries,
        acl::handlers::get_effective_permissions,
        acl::handlers::claim_ownership,
        principals::handlers::search_principals,
        principals::handlers::sync_entra_groups,
        convos::handlers::parse_conversation,
        convos::handlers::validate_conversation,
        convos::handlers::response_sender,
        messages::handlers::validate_feedback,
        messages::handlers::list_feedback_tags,
        messages::handlers::build_message_tree,
        presets::list_presets,
        presets::save_preset,
        presets::delete_presets,
    ),
    components(schemas(auth::ErrorResponse, lc_common::error::ValidationIssue)),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Caller identity"),
        (name = "permissions", description = "Resource sharing and principal search"),
        (name = "principals", description = "Directory maintenance"),
        (name = "convos", description = "Conversation option parsing"),
        (name = "messages", description = "Feedback and reply trees"),
        (name = "presets", description = "Saved conversation options"),
    ),
)]
pub struct ApiDoc;

/// API documentation routes.
fn api_docs() -> Router<AppState> {
    SwaggerUi::new("/api/docs")
        .url("/api/openapi.json", ApiDoc::openapi())
        .into()
}
