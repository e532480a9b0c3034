use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::recap::EmailRecap;

pub async fn list_for_portfolio(
    pool: &PgPool,
    portfolio_id: Uuid,
) -> Result<Vec<EmailRecap>, DatabaseError> {
    let recaps = sqlx::query_as::<_, EmailRecap>(
        "SELECT * FROM email_recaps WHERE portfolio_id = $1 ORDER BY sent_at DESC",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?;

    Ok(recaps)
}

pub async fn latest_for_portfolio(
    pool: &PgPool,
    portfolio_id: Uuid,
) -> Result<Option<EmailRecap>, DatabaseError> {
    let recap = sqlx::query_as::<_, EmailRecap>(
        "SELECT * FROM email_recaps WHERE portfolio_id = $1 ORDER BY sent_at DESC LIMIT 1",
    )
    .bind(portfolio_id)
    .fetch_optional(pool)
    .await?;

    Ok(recap)
}

pub async fn insert(
    pool: &PgPool,
    portfolio_id: Uuid,
    subject: &str,
    content: &str,
) -> Result<EmailRecap, DatabaseError> {
    let now = Utc::now();
    let recap = sqlx::query_as::<_, EmailRecap>(
        r#"
        INSERT INTO email_recaps (id, subject, content, portfolio_id, sent_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(subject)
    .bind(content)
    .bind(portfolio_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(recap)
}
