//! Shift Model (班次)
//!
//! One row per terminal per business date per open session. A store
//! may have zero, one, or many OPEN shifts simultaneously; the access
//! guard treats exactly-one as the only admissible state for a day
//! close.

use serde::{Deserialize, Serialize};

/// Shift status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ShiftStatus {
    Open,
    Closed,
}

impl Default for ShiftStatus {
    fn default() -> Self {
        Self::Open
    }
}

/// Shift entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Shift {
    pub id: i64,
    pub store_id: i64,
    /// Business date the shift was opened under (YYYY-MM-DD)
    pub business_date: String,
    /// Per store+date sequence, starting at 1
    pub shift_number: i64,
    #[serde(default)]
    pub status: ShiftStatus,
    /// Cashier working the shift; may be unassigned
    pub assigned_operator_id: Option<i64>,
    pub terminal_id: String,
    /// 开班时间 (Unix timestamp millis)
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub note: Option<String>,
}

/// Open shift payload (开班)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftOpen {
    pub terminal_id: String,
    pub assigned_operator_id: Option<i64>,
    pub note: Option<String>,
}

/// Close shift payload (收班)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftCloseRequest {
    pub note: Option<String>,
}
