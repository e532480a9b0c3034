use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::portfolio::{Portfolio, PortfolioCreate, PortfolioUpdate};

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Portfolio>, DatabaseError> {
    let portfolios = sqlx::query_as::<_, Portfolio>(
        "SELECT * FROM portfolios WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(portfolios)
}

/// Fetch a portfolio only when it belongs to the given user. Foreign
/// portfolios are indistinguishable from missing ones to the caller.
pub async fn find_owned(
    pool: &PgPool,
    portfolio_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Portfolio>, DatabaseError> {
    let portfolio = sqlx::query_as::<_, Portfolio>(
        "SELECT * FROM portfolios WHERE id = $1 AND user_id = $2",
    )
    .bind(portfolio_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(portfolio)
}

pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    data: &PortfolioCreate,
) -> Result<Portfolio, DatabaseError> {
    let now = Utc::now();
    let portfolio = sqlx::query_as::<_, Portfolio>(
        r#"
        INSERT INTO portfolios
            (id, name, description, email_frequency, email_instructions, user_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.email_frequency)
    .bind(&data.email_instructions)
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(portfolio)
}

/// Partial update: absent fields keep their stored values
pub async fn update(
    pool: &PgPool,
    portfolio_id: Uuid,
    user_id: Uuid,
    data: &PortfolioUpdate,
) -> Result<Option<Portfolio>, DatabaseError> {
    let portfolio = sqlx::query_as::<_, Portfolio>(
        r#"
        UPDATE portfolios SET
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            email_frequency = COALESCE($5, email_frequency),
            email_instructions = COALESCE($6, email_instructions),
            updated_at = $7
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(portfolio_id)
    .bind(user_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.email_frequency)
    .bind(&data.email_instructions)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(portfolio)
}

/// Delete a portfolio and everything hanging off it in one transaction.
/// Deletion order matters: holdings and recaps reference the portfolio row.
pub async fn delete_cascade(
    pool: &PgPool,
    portfolio_id: Uuid,
    user_id: Uuid,
) -> Result<bool, DatabaseError> {
    let mut tx = pool.begin().await?;

    let owned = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM portfolios WHERE id = $1 AND user_id = $2",
    )
    .bind(portfolio_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    if owned == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("DELETE FROM portfolio_holdings WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM email_recaps WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM portfolios WHERE id = $1")
        .bind(portfolio_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Record the stored path of the most recent upload. The previous value is
/// overwritten; the old artifact stays on disk.
pub async fn set_file_path(
    pool: &PgPool,
    portfolio_id: Uuid,
    file_path: &str,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE portfolios SET file_path = $2, updated_at = $3 WHERE id = $1")
        .bind(portfolio_id)
        .bind(file_path)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(())
}
