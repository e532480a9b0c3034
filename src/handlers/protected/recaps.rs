use axum::{extract::Path, http::StatusCode, response::Json, Extension};
use uuid::Uuid;

use crate::database::models::portfolio::Portfolio;
use crate::database::models::recap::{EmailRecap, RecapCreate};
use crate::database::{manager, portfolios, recaps};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /api/portfolios/:portfolio_id/recaps - newest first
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
) -> Result<Json<Vec<EmailRecap>>, ApiError> {
    let pool = manager::pool().await?;
    portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    let recaps = recaps::list_for_portfolio(&pool, portfolio_id).await?;
    Ok(Json(recaps))
}

/// GET /api/portfolios/:portfolio_id/recaps/latest
pub async fn latest(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
) -> Result<Json<EmailRecap>, ApiError> {
    let pool = manager::pool().await?;
    portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    let recap = recaps::latest_for_portfolio(&pool, portfolio_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No email recaps found for this portfolio"))?;

    Ok(Json(recap))
}

/// POST /api/portfolios/:portfolio_id/recaps - store a caller-provided recap
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
    Json(payload): Json<RecapCreate>,
) -> Result<(StatusCode, Json<EmailRecap>), ApiError> {
    let pool = manager::pool().await?;
    portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    let recap = recaps::insert(&pool, portfolio_id, &payload.subject, &payload.content).await?;
    Ok((StatusCode::CREATED, Json(recap)))
}

/// POST /api/portfolios/:portfolio_id/recaps/generate - template-based recap
/// built from portfolio metadata; actual email delivery is out of scope
pub async fn generate(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
) -> Result<(StatusCode, Json<EmailRecap>), ApiError> {
    let pool = manager::pool().await?;
    let portfolio = portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    let subject = format!("Portfolio Recap: {}", portfolio.name);
    let content = recap_content(&portfolio);

    let recap = recaps::insert(&pool, portfolio_id, &subject, &content).await?;
    Ok((StatusCode::CREATED, Json(recap)))
}

fn recap_content(portfolio: &Portfolio) -> String {
    format!(
        "Portfolio Recap for {name}\n\n\
         This is an automated recap of your portfolio performance.\n\n\
         Portfolio Details:\n\
         - Name: {name}\n\
         - Description: {description}\n\n\
         Generated automatically by Scout Portfolio Tracker.",
        name = portfolio.name,
        description = portfolio
            .description
            .as_deref()
            .unwrap_or("No description provided"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn generated_recap_includes_name_and_description_fallback() {
        let portfolio = Portfolio {
            id: Uuid::new_v4(),
            name: "Retirement".to_string(),
            description: None,
            email_frequency: None,
            email_instructions: None,
            file_path: None,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let content = recap_content(&portfolio);
        assert!(content.contains("Portfolio Recap for Retirement"));
        assert!(content.contains("No description provided"));
    }
}
