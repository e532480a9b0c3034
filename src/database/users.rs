use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::User;

pub async fn insert(
    pool: &PgPool,
    email: &str,
    hashed_password: &str,
) -> Result<User, DatabaseError> {
    let now = Utc::now();
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, hashed_password, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(hashed_password)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Postgres unique-violation check, used to turn a duplicate email into 409
pub fn is_unique_violation(err: &DatabaseError) -> bool {
    match err {
        DatabaseError::Sqlx(sqlx::Error::Database(db_err)) => {
            db_err.code().as_deref() == Some("23505")
        }
        _ => false,
    }
}
