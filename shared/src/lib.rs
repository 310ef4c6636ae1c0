//! Shared types for the lottery back-office
//!
//! Domain models and utility types used by both the server and its
//! callers (terminal frontend, provisioning tools). DB row types use
//! `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY, snowflake layout).

pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
