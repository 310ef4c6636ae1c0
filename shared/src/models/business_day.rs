//! Business Day Model (营业日)
//!
//! One row per store per trading date. `business_date` is fixed when
//! the day is opened and never recalculated at close, even if close
//! happens after midnight.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Business day status — the close state machine token
///
/// `OPEN → PENDING_CLOSE → CLOSED`; `PENDING_CLOSE → OPEN` on cancel.
/// The status column itself is the concurrency gate: every transition
/// is an `UPDATE … WHERE status = …`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum BusinessDayStatus {
    Open,
    PendingClose,
    Closed,
}

impl Default for BusinessDayStatus {
    fn default() -> Self {
        Self::Open
    }
}

/// Business day entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BusinessDay {
    pub id: i64,
    pub store_id: i64,
    /// Trading date (YYYY-MM-DD), fixed at open time
    pub business_date: String,
    #[serde(default)]
    pub status: BusinessDayStatus,
    /// 开始营业时间 (Unix timestamp millis)
    pub opened_at: i64,
    pub opened_by: i64,
    pub closed_at: Option<i64>,
    pub closed_by: Option<i64>,
    /// Settlement total in cents, written once at commit
    pub total_sales_cents: i64,
    pub total_units_sold: i64,
    /// Maintained by pack ingestion, not recomputed at close
    pub total_units_activated: i64,
}

/// Staging row produced by prepare(), one per pack being closed.
///
/// Owned by the PENDING_CLOSE episode: bulk-created at prepare,
/// consumed at commit, discarded at cancel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PendingClosing {
    pub id: i64,
    pub day_id: i64,
    pub pack_id: i64,
    pub closing_counter: i64,
    pub is_depleted: bool,
}

/// One closing entry in a prepare() request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingEntry {
    pub pack_id: i64,
    pub closing_counter: i64,
    #[serde(default)]
    pub is_depleted: bool,
}

/// Prepare payload — the scanned counters collected by the wizard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayClosePrepare {
    #[serde(default)]
    pub closings: Vec<ClosingEntry>,
}

/// Prepare result — preview shown before commit.
///
/// Computed with the same settlement arithmetic as commit, so the
/// estimate and the final total agree when inputs are unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCloseEstimate {
    pub day_id: i64,
    pub closings_count: i64,
    pub estimated_total: Decimal,
}

/// Permanent settlement record, one per pack included in a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DayUnitSnapshot {
    pub id: i64,
    pub day_id: i64,
    pub pack_id: i64,
    pub starting_counter: i64,
    pub ending_counter: i64,
    pub units_sold: i64,
    pub sales_amount_cents: i64,
}

/// Commit payload — actor resolved by the access guard beforehand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCloseCommit {
    pub actor_id: i64,
}

/// Closed-day read model: aggregates + per-pack settlement rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCloseSummary {
    pub day: BusinessDay,
    pub total_sales: Decimal,
    pub snapshots: Vec<DayUnitSnapshot>,
}
