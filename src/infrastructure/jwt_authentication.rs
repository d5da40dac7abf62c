use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: Uuid, email: &str, issued_at: DateTime<Utc>, ttl_days: i64) -> Self {
        let expires_at = issued_at + Duration::days(ttl_days);
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp().max(0) as usize,
            exp: expires_at.timestamp().max(0) as usize,
        }
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| anyhow!("Invalid user ID in token"))
    }
}

pub fn generate_token(secret: &str, claims: &Claims) -> Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| anyhow!("Failed to sign token: {}", err))
}

pub fn validate_token(secret: &str, token: &str) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|err| anyhow!("JWT validation failed: {}", err))?;

    Ok(token_data.claims)
}
