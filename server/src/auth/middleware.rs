//! Authentication Middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lc_common::permissions::SystemRole;

use crate::api::AppState;
use crate::principals::DirectoryUser;

use super::error::AuthError;
use super::jwt::validate_access_token;

/// Authenticated user injected into request extensions.
///
/// Use this in handlers to access the current user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Directory user ID.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Email (if set).
    pub email: Option<String>,
    /// System role.
    pub role: SystemRole,
    /// Id in the external identity provider (if any).
    pub id_on_the_source: Option<String>,
}

impl AuthUser {
    /// Value used for group membership, see [`DirectoryUser::member_key`].
    #[must_use]
    pub fn member_key(&self) -> &str {
        self.id_on_the_source.as_deref().unwrap_or(&self.id)
    }
}

impl From<DirectoryUser> for AuthUser {
    fn from(user: DirectoryUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            role: user.role,
            id_on_the_source: user.id_on_the_source,
        }
    }
}

/// Middleware to require authentication.
///
/// Extracts Bearer token from Authorization header, validates JWT,
/// loads user from the directory, and injects `AuthUser` into request
/// extensions. The directory's role wins over the role in the token.
///
/// # Usage
///
/// Apply to routes that require authentication:
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(axum::middleware::from_fn_with_state(state, require_auth))
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = validate_access_token(token, &state.config.jwt_secret)?;

    let user = state
        .directory
        .user(&claims.sub)
        .ok_or(AuthError::UserNotFound)?;

    if user.role != claims.role {
        tracing::debug!(
            user_id = %user.id,
            token_role = %claims.role,
            directory_role = %user.role,
            "Token role differs from directory role"
        );
    }

    request.extensions_mut().insert(AuthUser::from(user));

    Ok(next.run(request).await)
}

/// Extractor for authenticated user in handlers.
///
/// ```ignore
/// async fn protected_handler(auth_user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", auth_user.id)
/// }
/// ```
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
