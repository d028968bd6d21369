//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:3080")
    pub bind_address: String,

    /// JWT signing secret (HS256)
    pub jwt_secret: String,

    /// JWT access token expiry in seconds (default: 900 = 15 min)
    pub jwt_access_expiry: i64,

    /// JSON file with users and groups to seed the directory from
    pub directory_seed_path: Option<String>,

    /// Default per-type limit of a principal search (default: 10)
    pub principal_search_limit: u32,

    /// Allowed CORS origin (any origin when unset)
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3080".into()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_access_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            directory_seed_path: env::var("DIRECTORY_SEED_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            principal_search_limit: env::var("PRINCIPAL_SEARCH_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN").ok(),
        })
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:3080".into(),
            jwt_secret: "test-secret".into(),
            jwt_access_expiry: 900,
            directory_seed_path: None,
            principal_search_limit: 10,
            cors_allow_origin: None,
        }
    }
}
