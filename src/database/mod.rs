pub mod holdings;
pub mod manager;
pub mod models;
pub mod portfolios;
pub mod recaps;
pub mod users;

pub use manager::DatabaseError;
