use axum::{extract::Path, http::StatusCode, response::Json, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::portfolio::{Portfolio, PortfolioCreate, PortfolioUpdate};
use crate::database::{manager, portfolios};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /api/portfolios - List the caller's portfolios
pub async fn list(Extension(user): Extension<AuthUser>) -> Result<Json<Vec<Portfolio>>, ApiError> {
    let pool = manager::pool().await?;
    let portfolios = portfolios::list_for_user(&pool, user.user_id).await?;
    Ok(Json(portfolios))
}

/// GET /api/portfolios/:portfolio_id
pub async fn get(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
) -> Result<Json<Portfolio>, ApiError> {
    let pool = manager::pool().await?;
    let portfolio = portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    Ok(Json(portfolio))
}

/// POST /api/portfolios
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PortfolioCreate>,
) -> Result<(StatusCode, Json<Portfolio>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("Portfolio name is required"));
    }

    let pool = manager::pool().await?;
    let portfolio = portfolios::insert(&pool, user.user_id, &payload).await?;

    tracing::info!(portfolio_id = %portfolio.id, "Portfolio created");
    Ok((StatusCode::CREATED, Json(portfolio)))
}

/// PUT /api/portfolios/:portfolio_id
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
    Json(payload): Json<PortfolioUpdate>,
) -> Result<Json<Portfolio>, ApiError> {
    let pool = manager::pool().await?;
    let portfolio = portfolios::update(&pool, portfolio_id, user.user_id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    Ok(Json(portfolio))
}

/// DELETE /api/portfolios/:portfolio_id - cascades to holdings and recaps
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = manager::pool().await?;
    let deleted = portfolios::delete_cascade(&pool, portfolio_id, user.user_id).await?;

    if !deleted {
        return Err(ApiError::not_found("Portfolio not found"));
    }

    Ok(Json(json!({ "message": "Portfolio deleted successfully" })))
}
