pub mod auth;
pub mod holdings;
pub mod portfolios;
pub mod recaps;
pub mod upload;
