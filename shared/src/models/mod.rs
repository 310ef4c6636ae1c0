//! Data models
//!
//! Shared between backoffice-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).
//! Monetary amounts are integer cents (see [`crate::money`]).

pub mod access;
pub mod business_day;
pub mod operator;
pub mod outbox;
pub mod pack;
pub mod shift;

// Re-exports
pub use access::*;
pub use business_day::*;
pub use operator::*;
pub use outbox::*;
pub use pack::*;
pub use shift::*;
