use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Shared connection pool, created lazily on first use. The schema is
/// bootstrapped alongside pool creation so a fresh database is usable
/// without a separate migration step.
pub async fn pool() -> Result<PgPool, DatabaseError> {
    let pool = POOL
        .get_or_try_init(|| async {
            let url = std::env::var("DATABASE_URL")
                .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

            let db_config = &config::config().database;
            let pool = PgPoolOptions::new()
                .max_connections(db_config.max_connections)
                .acquire_timeout(Duration::from_secs(db_config.connection_timeout_secs))
                .connect(&url)
                .await?;

            bootstrap_schema(&pool).await?;

            info!("Created database pool");
            Ok::<_, DatabaseError>(pool)
        })
        .await?;

    Ok(pool.clone())
}

/// Pings the pool to ensure connectivity
pub async fn health_check() -> Result<(), DatabaseError> {
    let pool = pool().await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(())
}

/// Create tables on first connect when they do not exist yet
async fn bootstrap_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolios (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            email_frequency TEXT,
            email_instructions TEXT,
            file_path TEXT,
            user_id UUID NOT NULL REFERENCES users(id),
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolio_holdings (
            id UUID PRIMARY KEY,
            symbol TEXT NOT NULL,
            name TEXT,
            quantity NUMERIC(18, 8),
            price NUMERIC(18, 2),
            market_value NUMERIC(18, 2),
            weight NUMERIC(5, 2),
            sector TEXT,
            validated BOOLEAN NOT NULL DEFAULT FALSE,
            validation_status TEXT,
            portfolio_id UUID NOT NULL REFERENCES portfolios(id),
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS email_recaps (
            id UUID PRIMARY KEY,
            subject TEXT NOT NULL,
            content TEXT NOT NULL,
            portfolio_id UUID NOT NULL REFERENCES portfolios(id),
            sent_at TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
