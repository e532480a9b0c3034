use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Holding {
    pub id: Uuid,
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub sector: Option<String>,
    pub validated: bool,
    pub validation_status: Option<String>,
    pub portfolio_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct HoldingCreate {
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub sector: Option<String>,
}

/// Partial update; absent fields keep their stored values
#[derive(Debug, Deserialize)]
pub struct HoldingUpdate {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub sector: Option<String>,
    pub validated: Option<bool>,
    pub validation_status: Option<String>,
}
