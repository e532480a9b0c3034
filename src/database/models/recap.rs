use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailRecap {
    pub id: Uuid,
    pub subject: String,
    pub content: String,
    pub portfolio_id: Uuid,
    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RecapCreate {
    pub subject: String,
    pub content: String,
}
