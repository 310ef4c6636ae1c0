//! Pack Model (票包)
//!
//! A pack is a physical batch of sellable lottery tickets tracked by a
//! counter, assigned to one bin. Counters only advance; the pack's own
//! `opening_counter` is never mutated by a day close — interim counts
//! live in the day's settlement snapshots.

use serde::{Deserialize, Serialize};

/// Pack status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PackStatus {
    Active,
    Depleted,
}

impl Default for PackStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Pack entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Pack {
    pub id: i64,
    pub store_id: i64,
    /// Physical slot holding this pack
    pub bin_id: i64,
    pub opening_counter: i64,
    /// Ticket price in cents
    pub unit_price_cents: i64,
    #[serde(default)]
    pub status: PackStatus,
    pub created_at: i64,
}

/// Create pack payload (provisioning / ingestion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackCreate {
    pub bin_id: i64,
    #[serde(default)]
    pub opening_counter: i64,
    pub unit_price_cents: i64,
}
