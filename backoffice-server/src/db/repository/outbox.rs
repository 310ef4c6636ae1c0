//! Outbox Repository — durable replication queue
//!
//! The lifecycle writes entries inside its own transaction; the sync
//! worker drains PENDING entries in priority order and marks them
//! SENT/FAILED out-of-band.

use super::{RepoError, RepoResult};
use shared::models::{OutboxEnqueue, OutboxEntry};
use shared::util::{now_millis, snowflake_id};
use sqlx::{Acquire, Sqlite, SqlitePool, Transaction};

const OUTBOX_COLUMNS: &str = "id, entity_type, entity_id, operation, payload, priority, status, attempts, last_error, created_at, sent_at";

/// Fire-and-forget write outcome. `Failed` is caught by the lifecycle
/// and degraded to a logged event — never allowed to roll back the
/// enclosing day transition.
#[derive(Debug)]
pub enum OutboxWriteResult {
    Enqueued(i64),
    Failed(String),
}

/// Enqueue within an open transaction, isolated behind a savepoint.
///
/// The savepoint keeps a failed insert from poisoning the outer
/// transaction: on error only the savepoint rolls back and the caller
/// receives `Failed` to log.
pub async fn enqueue_in(
    tx: &mut Transaction<'_, Sqlite>,
    entry: &OutboxEnqueue,
) -> OutboxWriteResult {
    let mut savepoint = match tx.begin().await {
        Ok(sp) => sp,
        Err(e) => return OutboxWriteResult::Failed(e.to_string()),
    };

    let id = snowflake_id();
    let payload = match serde_json::to_string(&entry.payload) {
        Ok(p) => p,
        Err(e) => return OutboxWriteResult::Failed(format!("Payload serialization: {e}")),
    };

    let insert = sqlx::query(
        "INSERT INTO outbox (id, entity_type, entity_id, operation, payload, priority, status, attempts, created_at) VALUES (?, ?, ?, ?, ?, ?, 'PENDING', 0, ?)",
    )
    .bind(id)
    .bind(&entry.entity_type)
    .bind(entry.entity_id)
    .bind(&entry.operation)
    .bind(payload)
    .bind(entry.priority)
    .bind(now_millis())
    .execute(&mut *savepoint)
    .await;

    match insert {
        Ok(_) => match savepoint.commit().await {
            Ok(()) => OutboxWriteResult::Enqueued(id),
            Err(e) => OutboxWriteResult::Failed(e.to_string()),
        },
        Err(e) => {
            let _ = savepoint.rollback().await;
            OutboxWriteResult::Failed(e.to_string())
        }
    }
}

/// Standalone enqueue for producers outside the close transaction
pub async fn enqueue(pool: &SqlitePool, entry: &OutboxEnqueue) -> RepoResult<i64> {
    let mut tx = pool.begin().await?;
    let result = enqueue_in(&mut tx, entry).await;
    tx.commit().await?;
    match result {
        OutboxWriteResult::Enqueued(id) => Ok(id),
        OutboxWriteResult::Failed(err) => Err(RepoError::Database(err)),
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<OutboxEntry>> {
    let entry = sqlx::query_as::<_, OutboxEntry>(&format!(
        "SELECT {OUTBOX_COLUMNS} FROM outbox WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

/// Next batch to drain: PENDING first by priority, then FIFO
pub async fn list_pending(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<OutboxEntry>> {
    let entries = sqlx::query_as::<_, OutboxEntry>(&format!(
        "SELECT {OUTBOX_COLUMNS} FROM outbox WHERE status = 'PENDING' ORDER BY priority, id LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

/// Backlog size, for logging and for the observability layer
pub async fn count_pending(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outbox WHERE status = 'PENDING'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Cloud confirmed delivery
pub async fn mark_sent(pool: &SqlitePool, ids: &[i64]) -> RepoResult<()> {
    let now = now_millis();
    for id in ids {
        sqlx::query(
            "UPDATE outbox SET status = 'SENT', sent_at = ?, attempts = attempts + 1 WHERE id = ?",
        )
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Delivery attempt failed — keep PENDING for retry until the attempt
/// budget is spent, then park as FAILED for reconciliation.
pub async fn mark_attempt_failed(
    pool: &SqlitePool,
    id: i64,
    error: &str,
    max_attempts: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE outbox SET attempts = attempts + 1, last_error = ?, status = CASE WHEN attempts + 1 >= ? THEN 'FAILED' ELSE 'PENDING' END WHERE id = ?",
    )
    .bind(error)
    .bind(max_attempts)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
