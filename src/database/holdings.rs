use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::holding::{Holding, HoldingCreate, HoldingUpdate};
use crate::ingest::NewHolding;

pub async fn list_for_portfolio(
    pool: &PgPool,
    portfolio_id: Uuid,
) -> Result<Vec<Holding>, DatabaseError> {
    let holdings = sqlx::query_as::<_, Holding>(
        "SELECT * FROM portfolio_holdings WHERE portfolio_id = $1 ORDER BY created_at",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?;

    Ok(holdings)
}

pub async fn insert(
    pool: &PgPool,
    portfolio_id: Uuid,
    data: &HoldingCreate,
) -> Result<Holding, DatabaseError> {
    let now = Utc::now();
    let holding = sqlx::query_as::<_, Holding>(
        r#"
        INSERT INTO portfolio_holdings
            (id, symbol, name, quantity, price, market_value, weight, sector,
             validated, validation_status, portfolio_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, 'pending', $9, $10, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&data.symbol)
    .bind(&data.name)
    .bind(data.quantity)
    .bind(data.price)
    .bind(data.market_value)
    .bind(data.weight)
    .bind(&data.sector)
    .bind(portfolio_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(holding)
}

/// Partial update: absent fields keep their stored values
pub async fn update(
    pool: &PgPool,
    portfolio_id: Uuid,
    holding_id: Uuid,
    data: &HoldingUpdate,
) -> Result<Option<Holding>, DatabaseError> {
    let holding = sqlx::query_as::<_, Holding>(
        r#"
        UPDATE portfolio_holdings SET
            symbol = COALESCE($3, symbol),
            name = COALESCE($4, name),
            quantity = COALESCE($5, quantity),
            price = COALESCE($6, price),
            market_value = COALESCE($7, market_value),
            weight = COALESCE($8, weight),
            sector = COALESCE($9, sector),
            validated = COALESCE($10, validated),
            validation_status = COALESCE($11, validation_status),
            updated_at = $12
        WHERE id = $2 AND portfolio_id = $1
        RETURNING *
        "#,
    )
    .bind(portfolio_id)
    .bind(holding_id)
    .bind(&data.symbol)
    .bind(&data.name)
    .bind(data.quantity)
    .bind(data.price)
    .bind(data.market_value)
    .bind(data.weight)
    .bind(&data.sector)
    .bind(data.validated)
    .bind(&data.validation_status)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(holding)
}

pub async fn delete(
    pool: &PgPool,
    portfolio_id: Uuid,
    holding_id: Uuid,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM portfolio_holdings WHERE id = $2 AND portfolio_id = $1")
        .bind(portfolio_id)
        .bind(holding_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Replace the portfolio's holdings with the staged set in one transaction.
/// Concurrent readers see either the old full set or the new full set,
/// never a mix. Returns the number of holdings created.
pub async fn replace_holdings(
    pool: &PgPool,
    portfolio_id: Uuid,
    staged: &[NewHolding],
) -> Result<usize, DatabaseError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM portfolio_holdings WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .execute(&mut *tx)
        .await?;

    let now = Utc::now();
    for holding in staged {
        sqlx::query(
            r#"
            INSERT INTO portfolio_holdings
                (id, symbol, name, quantity, price, market_value, weight, sector,
                 validated, validation_status, portfolio_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL, $7, $8, $9, $10, $11, $11)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&holding.symbol)
        .bind(&holding.name)
        .bind(holding.quantity)
        .bind(holding.price)
        .bind(holding.market_value)
        .bind(&holding.sector)
        .bind(holding.validated)
        .bind(&holding.validation_status)
        .bind(portfolio_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(staged.len())
}
