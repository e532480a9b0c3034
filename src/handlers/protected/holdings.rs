use axum::{extract::Path, http::StatusCode, response::Json, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::holding::{Holding, HoldingCreate, HoldingUpdate};
use crate::database::{holdings, manager, portfolios};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /api/portfolios/:portfolio_id/holdings
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
) -> Result<Json<Vec<Holding>>, ApiError> {
    let pool = manager::pool().await?;
    portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    let holdings = holdings::list_for_portfolio(&pool, portfolio_id).await?;
    Ok(Json(holdings))
}

/// POST /api/portfolios/:portfolio_id/holdings
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
    Json(payload): Json<HoldingCreate>,
) -> Result<(StatusCode, Json<Holding>), ApiError> {
    if payload.symbol.trim().is_empty() {
        return Err(ApiError::bad_request("Holding symbol is required"));
    }

    let pool = manager::pool().await?;
    portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    let holding = holdings::insert(&pool, portfolio_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(holding)))
}

/// PUT /api/portfolios/:portfolio_id/holdings/:holding_id
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path((portfolio_id, holding_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<HoldingUpdate>,
) -> Result<Json<Holding>, ApiError> {
    let pool = manager::pool().await?;
    portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    let holding = holdings::update(&pool, portfolio_id, holding_id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Holding not found"))?;

    Ok(Json(holding))
}

/// DELETE /api/portfolios/:portfolio_id/holdings/:holding_id
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path((portfolio_id, holding_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    let pool = manager::pool().await?;
    portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    if !holdings::delete(&pool, portfolio_id, holding_id).await? {
        return Err(ApiError::not_found("Holding not found"));
    }

    Ok(Json(json!({ "message": "Holding deleted successfully" })))
}
