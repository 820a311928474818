use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};

pub mod password;

pub use password::{hash_password, verify_password};

/// Identity claim carried by every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Lifetimes above `MAX_JWT_EXPIRY_HOURS` are clamped.
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let hours = expiry_hours.min(MAX_JWT_EXPIRY_HOURS) as i64;
        let exp = (now + Duration::hours(hours)).timestamp();

        Self {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Issue a fresh token for `user_id` using the configured lifetime.
pub fn issue_token(user_id: Uuid, security: &SecurityConfig) -> Result<String, JwtError> {
    generate_jwt(&Claims::new(user_id, security.jwt_expiry_hours), security)
}

/// Verify signature and expiry, returning the decoded claims.
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security(secret: &str) -> SecurityConfig {
        let mut security = AppConfig::development().security;
        security.jwt_secret = secret.to_string();
        security
    }

    #[test]
    fn issued_token_round_trips_user_id() {
        let security = security("unit-test-secret");
        let user_id = Uuid::new_v4();

        let token = issue_token(user_id, &security).unwrap();
        let claims = validate_jwt(&token, &security).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), &security("one")).unwrap();
        assert!(matches!(
            validate_jwt(&token, &security("two")),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let security = security("unit-test-secret");
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = generate_jwt(&claims, &security).unwrap();

        assert!(validate_jwt(&token, &security).is_err());
    }

    #[test]
    fn oversized_lifetime_is_clamped_not_wrapped() {
        let claims = Claims::new(Uuid::new_v4(), u64::MAX);
        assert_eq!(claims.exp - claims.iat, MAX_JWT_EXPIRY_HOURS as i64 * 3600);

        let security = {
            let mut security = security("unit-test-secret");
            security.jwt_expiry_hours = u64::MAX;
            security
        };
        let token = issue_token(Uuid::new_v4(), &security).unwrap();
        assert!(validate_jwt(&token, &security).is_ok());
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        assert!(matches!(
            issue_token(Uuid::new_v4(), &security("")),
            Err(JwtError::InvalidSecret)
        ));
    }
}
