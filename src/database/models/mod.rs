pub mod holding;
pub mod portfolio;
pub mod recap;
pub mod user;

pub use holding::Holding;
pub use portfolio::Portfolio;
pub use recap::EmailRecap;
pub use user::User;
