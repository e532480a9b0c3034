use axum::{response::Json, Extension};

use crate::database::models::user::UserResponse;
use crate::database::{manager, users};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /api/auth/me - Current user from the bearer token
pub async fn me(Extension(user): Extension<AuthUser>) -> Result<Json<UserResponse>, ApiError> {
    let pool = manager::pool().await?;
    let record = users::find_by_id(&pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(record.into()))
}
