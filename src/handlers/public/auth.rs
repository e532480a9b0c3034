use axum::{http::StatusCode, response::Json};
use serde::Deserialize;

use crate::auth::{self, TokenPair, TOKEN_KIND_REFRESH};
use crate::database::models::user::UserResponse;
use crate::database::{manager, users};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/auth/register - Create a user account
pub async fn register(
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let pool = manager::pool().await?;
    let hashed = auth::hash_password(&payload.password)?;

    let user = match users::insert(&pool, &email, &hashed).await {
        Ok(user) => user,
        Err(e) if users::is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login - Authenticate and receive a token pair
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<TokenPair>, ApiError> {
    let pool = manager::pool().await?;
    let email = payload.email.trim().to_lowercase();

    let user = users::find_by_email(&pool, &email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !auth::verify_password(&payload.password, &user.hashed_password)? {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    Ok(Json(auth::token_pair(&user)?))
}

/// POST /api/auth/refresh - Trade a refresh token for a fresh pair
pub async fn refresh(Json(payload): Json<RefreshRequest>) -> Result<Json<TokenPair>, ApiError> {
    let claims = auth::validate_jwt(&payload.refresh_token)?;

    if claims.kind != TOKEN_KIND_REFRESH {
        return Err(ApiError::unauthorized("Refresh token required"));
    }

    // The account must still exist for the pair to be reissued
    let pool = manager::pool().await?;
    let user = users::find_by_id(&pool, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(Json(auth::token_pair(&user)?))
}
