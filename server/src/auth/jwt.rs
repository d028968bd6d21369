//! JWT Token Generation and Validation
//!
//! Access tokens are signed with HS256 using the shared `JWT_SECRET`, so the
//! chat application that authenticates users can mint them directly.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lc_common::permissions::SystemRole;
use serde::{Deserialize, Serialize};

use super::error::{AuthError, AuthResult};

/// JWT claims of an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (directory user ID).
    pub sub: String,
    /// System role at issue time.
    pub role: SystemRole,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
}

/// Generate an access token.
///
/// # Arguments
/// * `user_id` - The directory user ID
/// * `role` - The user's system role
/// * `secret` - HS256 signing secret
/// * `expiry_seconds` - Token validity (typically 900 = 15 min)
pub fn generate_access_token(
    user_id: &str,
    role: SystemRole,
    secret: &str,
    expiry_seconds: i64,
) -> AuthResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: (now + Duration::seconds(expiry_seconds)).timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Validate and decode an access token.
///
/// Returns an error if the token is malformed, badly signed, or expired.
pub fn validate_access_token(token: &str, secret: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AuthError::InvalidToken);
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_generate_and_validate() {
        let token = generate_access_token("user-1", SystemRole::User, SECRET, 900).unwrap();
        assert!(!token.is_empty());

        let claims = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, SystemRole::User);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = generate_access_token("user-1", SystemRole::Admin, SECRET, 900).unwrap();
        let result = validate_access_token(&token, "other-secret");
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_fails() {
        let token = generate_access_token("user-1", SystemRole::User, SECRET, -60).unwrap();
        let result = validate_access_token(&token, SECRET);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_garbage_token_fails() {
        assert!(validate_access_token("not.a.token", SECRET).is_err());
    }
}
