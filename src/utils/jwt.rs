// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Roles allowed to browse exam results.
pub const STAFF_ROLES: [&str; 3] = ["SuperAdmin", "Interviewer", "HRM"];

/// The user snapshot carried inside a token.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenUser {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    pub data: TokenUser,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a token for `user`, valid for `expiration_seconds`.
pub fn sign_jwt(user: &TokenUser, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Unexpected(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        data: user.clone(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Unexpected(e.to_string()))
}

/// Verifies and decodes a JWT string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("invalid_token".to_string()))?;

    Ok(token_data.claims)
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AppError> {
    header_value
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("missing_token".to_string()))
}

pub fn is_staff(role: &str) -> bool {
    STAFF_ROLES.contains(&role)
}

/// Axum Middleware: Authentication.
///
/// Validates the bearer token and injects `Claims` into the request extensions.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = bearer_token(auth_header)?;
    let claims = verify_jwt(token, &config.jwt_secret)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Axum Middleware: Staff Authorization.
///
/// Must be used AFTER `auth_middleware`.
pub async fn staff_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("missing_token".to_string()))?;

    if !is_staff(&claims.data.role) {
        return Err(AppError::Unauthorized("permission_denied".to_string()));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> TokenUser {
        TokenUser {
            id: None,
            role: role.to_string(),
            email: None,
        }
    }

    #[test]
    fn signed_token_verifies_with_same_secret() {
        let token = sign_jwt(&user("HRM"), "secret", 60).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.data.role, "HRM");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_jwt(&user("HRM"), "secret", 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(bearer_token(Some("abc")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
        assert!(bearer_token(None).is_err());
    }

    #[test]
    fn only_staff_roles_pass() {
        for role in STAFF_ROLES {
            assert!(is_staff(role));
        }
        assert!(!is_staff("Student"));
        assert!(!is_staff("hrm"));
    }
}
