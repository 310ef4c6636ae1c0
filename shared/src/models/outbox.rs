//! Replication Outbox Model (同步队列)
//!
//! Durable local queue feeding asynchronous replication to the cloud.
//! The lifecycle writes entries inside its own transaction; the sync
//! worker drains them out-of-band.

use serde::{Deserialize, Serialize};

/// Outbox delivery status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

/// Outbox entry row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OutboxEntry {
    pub id: i64,
    /// e.g. "day_close"
    pub entity_type: String,
    pub entity_id: i64,
    /// e.g. "upsert"
    pub operation: String,
    /// JSON document describing the change
    pub payload: String,
    /// Lower value drains first
    pub priority: i64,
    pub status: OutboxStatus,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub sent_at: Option<i64>,
}

/// Enqueue request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEnqueue {
    pub entity_type: String,
    pub entity_id: i64,
    pub operation: String,
    pub payload: serde_json::Value,
    #[serde(default = "default_priority")]
    pub priority: i64,
}

fn default_priority() -> i64 {
    100
}

/// Batch pushed to the cloud by the sync worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncBatch {
    pub store_id: i64,
    pub items: Vec<OutboxEntry>,
    pub sent_at: i64,
}

/// Cloud acknowledgement for a pushed batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncBatchResponse {
    pub accepted: i64,
    #[serde(default)]
    pub rejected: i64,
    #[serde(default)]
    pub errors: Vec<String>,
}
