use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Portfolio {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub email_frequency: Option<String>,
    pub email_instructions: Option<String>,
    pub file_path: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioCreate {
    pub name: String,
    pub description: Option<String>,
    pub email_frequency: Option<String>,
    pub email_instructions: Option<String>,
}

/// Partial update; absent fields keep their stored values
#[derive(Debug, Deserialize)]
pub struct PortfolioUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub email_frequency: Option<String>,
    pub email_instructions: Option<String>,
}
