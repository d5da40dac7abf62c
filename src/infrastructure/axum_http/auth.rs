use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};
use uuid::Uuid;

use super::error_responses::AppError;
use crate::infrastructure::jwt_authentication;

/// Token settings shared with the extractor through a request extension.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub cookie_name: String,
    pub secure_cookie: bool,
}

/// The caller resolved from a valid session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Reads the token from `Authorization: Bearer|Token <jwt>`, then from the auth cookie.
fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("Token "))
            .map(str::trim)
            .filter(|token| !token.is_empty());
        if let Some(token) = token {
            return Some(token.to_string());
        }
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let settings = parts
            .extensions
            .get::<Arc<AuthSettings>>()
            .cloned()
            .ok_or_else(|| {
                error!("auth: AuthSettings extension is missing from the router");
                AppError::Internal(anyhow::anyhow!("auth settings are not configured"))
            })?;

        let token = token_from_headers(&parts.headers, &settings.cookie_name)
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let claims = jwt_authentication::validate_token(&settings.secret, &token).map_err(|err| {
            debug!(error = %err, "auth: token rejected");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}
