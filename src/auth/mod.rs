use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::database::models::user::User;

/// Token kinds issued by this API. Refresh tokens are only accepted by the
/// refresh endpoint; everything behind the auth middleware requires access.
pub const TOKEN_KIND_ACCESS: &str = "access";
pub const TOKEN_KIND_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub kind: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn access(user: &User) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.access_token_expiry_hours;
        Self {
            sub: user.id,
            email: user.email.clone(),
            kind: TOKEN_KIND_ACCESS.to_string(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn refresh(user: &User) -> Self {
        let now = Utc::now();
        let expiry_days = config::config().security.refresh_token_expiry_days;
        Self {
            sub: user.id,
            email: user.email.clone(),
            kind: TOKEN_KIND_REFRESH.to_string(),
            exp: (now + Duration::days(expiry_days as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, AuthError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Issue a fresh access + refresh pair for a user
pub fn token_pair(user: &User) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access_token: generate_jwt(&Claims::access(user))?,
        refresh_token: generate_jwt(&Claims::refresh(user))?,
        token_type: "bearer",
    })
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "trader@example.com".to_string(),
            hashed_password: "x".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let user = test_user();
        let token = generate_jwt(&Claims::access(&user)).unwrap();
        let claims = validate_jwt(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.kind, TOKEN_KIND_ACCESS);
    }

    #[test]
    fn refresh_token_carries_refresh_kind() {
        let user = test_user();
        let pair = token_pair(&user).unwrap();
        let claims = validate_jwt(&pair.refresh_token).unwrap();
        assert_eq!(claims.kind, TOKEN_KIND_REFRESH);
        assert_eq!(pair.token_type, "bearer");
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            validate_jwt("not-a-jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }
}
