//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum
//! router, a seeded principal directory, and JWT generation.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use lc_common::permissions::{PrincipalSource, SystemRole};
use lc_server::api::{create_router, AppState};
use lc_server::auth::jwt;
use lc_server::config::Config;
use lc_server::principals::{Directory, DirectoryGroup, DirectoryUser};
use tower::ServiceExt;

pub const ADMIN_ID: &str = "admin-1";
pub const ALICE_ID: &str = "alice-1";
pub const BOB_ID: &str = "bob-1";
pub const CAROL_ID: &str = "carol-1";
pub const ENGINEERING_ID: &str = "group-eng";

fn user(id: &str, name: &str, email: &str, role: SystemRole) -> DirectoryUser {
    let mut user = DirectoryUser::new(id, name, role);
    user.email = Some(email.to_string());
    user.username = Some(name.split(' ').next().unwrap_or(name).to_lowercase());
    user
}

/// Directory shared by every test: one admin, three users, one group.
pub fn seeded_directory() -> Directory {
    let directory = Directory::new();
    directory.upsert_user(user(ADMIN_ID, "Ada Admin", "ada@example.com", SystemRole::Admin));
    directory.upsert_user(user(ALICE_ID, "Alice Smith", "alice@example.com", SystemRole::User));
    directory.upsert_user(user(BOB_ID, "Bob Jones", "bob@example.com", SystemRole::User));
    directory.upsert_user(user(CAROL_ID, "Carol White", "carol@example.com", SystemRole::User));
    directory.upsert_group(DirectoryGroup {
        id: ENGINEERING_ID.to_string(),
        name: "Engineering".to_string(),
        description: Some("Product engineers".to_string()),
        email: Some("eng@example.com".to_string()),
        avatar: None,
        member_ids: vec![ALICE_ID.to_string(), BOB_ID.to_string()],
        source: PrincipalSource::Local,
        id_on_the_source: None,
    });
    directory
}

/// Shared test application that routes requests via `tower::ServiceExt::oneshot`.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test app over the seeded directory.
    pub fn new() -> Self {
        Self::with_config(Config::default_for_test())
    }

    /// Create a new test app with a custom config.
    pub fn with_config(config: Config) -> Self {
        let state = AppState::new(config, seeded_directory());
        let router = create_router(state.clone());
        Self { router, state }
    }

    /// Build a request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Access token for a seeded user, carrying their directory role.
    pub fn token_for(&self, user_id: &str) -> String {
        let role = self
            .state
            .directory
            .user(user_id)
            .map_or(SystemRole::User, |u| u.role);
        jwt::generate_access_token(
            user_id,
            role,
            &self.state.config.jwt_secret,
            self.state.config.jwt_access_expiry,
        )
        .expect("Failed to generate access token")
    }

    /// Authenticated GET.
    pub async fn get(&self, uri: &str, token: &str) -> Response<Body> {
        let req = Self::request(Method::GET, uri)
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.oneshot(req).await
    }

    /// Authenticated request with a JSON body.
    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> Response<Body> {
        let req = Self::request(method, uri)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap();
        self.oneshot(req).await
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
