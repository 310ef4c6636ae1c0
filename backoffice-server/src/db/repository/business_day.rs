//! Business Day Repository — the close state machine
//!
//! `OPEN --prepare--> PENDING_CLOSE --commit--> CLOSED`
//! `PENDING_CLOSE --cancel--> OPEN`
//!
//! Each transition runs in one transaction and is guarded by an
//! `UPDATE … WHERE status = …`; the status column is the only
//! concurrency token. A second terminal racing the same transition
//! sees zero affected rows and gets `InvalidState` deterministically.
//!
//! PENDING_CLOSE and its staging rows are durable: after a process
//! restart the caller can re-read the day, reload the pending entries
//! and either resume toward commit or cancel.

use super::{RepoError, RepoResult, outbox};
use shared::models::{
    BusinessDay, ClosingEntry, DayUnitSnapshot, OutboxEnqueue, Pack, PendingClosing,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;

const DAY_COLUMNS: &str = "id, store_id, business_date, status, opened_at, opened_by, closed_at, closed_by, total_sales_cents, total_units_sold, total_units_activated";

/// Settlement arithmetic, shared by prepare (estimate) and commit.
///
/// Plain subtraction by design: a closing counter below the opening
/// counter produces negative sales rather than an error. Flagged to
/// product owners; do not "fix" silently.
pub fn settle(opening_counter: i64, closing_counter: i64, unit_price_cents: i64) -> (i64, i64) {
    let units_sold = closing_counter - opening_counter;
    (units_sold, units_sold * unit_price_cents)
}

/// Totals returned by prepare(), computed like commit will compute them
#[derive(Debug, Clone, Copy)]
pub struct PrepareTotals {
    pub closings_count: i64,
    pub estimated_total_cents: i64,
}

/// Aggregates produced by commit()
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub day: BusinessDay,
    pub snapshots: Vec<DayUnitSnapshot>,
    pub next_day: BusinessDay,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<BusinessDay>> {
    let day = sqlx::query_as::<_, BusinessDay>(&format!(
        "SELECT {DAY_COLUMNS} FROM business_day WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(day)
}

/// The store's current day: the one OPEN day, or the day mid-close
/// (PENDING_CLOSE survives restarts and must stay visible).
pub async fn find_current(pool: &SqlitePool, store_id: i64) -> RepoResult<Option<BusinessDay>> {
    let day = sqlx::query_as::<_, BusinessDay>(&format!(
        "SELECT {DAY_COLUMNS} FROM business_day WHERE store_id = ? AND status IN ('OPEN', 'PENDING_CLOSE') ORDER BY opened_at DESC LIMIT 1"
    ))
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(day)
}

/// Idempotent get-or-create for the store's trading day.
///
/// Returns the existing OPEN/PENDING_CLOSE day if the store has one
/// (never creates a second in-flight day); otherwise opens a new day
/// for `business_date`. `business_date` is fixed here and never
/// recalculated at close.
pub async fn get_or_create(
    pool: &SqlitePool,
    store_id: i64,
    business_date: &str,
    opened_by: i64,
) -> RepoResult<BusinessDay> {
    let mut tx = pool.begin().await?;
    let day = get_or_create_tx(&mut tx, store_id, business_date, opened_by).await?;
    tx.commit().await?;
    Ok(day)
}

async fn get_or_create_tx(
    conn: &mut SqliteConnection,
    store_id: i64,
    business_date: &str,
    opened_by: i64,
) -> RepoResult<BusinessDay> {
    if let Some(existing) = sqlx::query_as::<_, BusinessDay>(&format!(
        "SELECT {DAY_COLUMNS} FROM business_day WHERE store_id = ? AND status IN ('OPEN', 'PENDING_CLOSE') ORDER BY opened_at DESC LIMIT 1"
    ))
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?
    {
        return Ok(existing);
    }

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO business_day (id, store_id, business_date, status, opened_at, opened_by) VALUES (?, ?, ?, 'OPEN', ?, ?)",
    )
    .bind(id)
    .bind(store_id)
    .bind(business_date)
    .bind(now)
    .bind(opened_by)
    .execute(&mut *conn)
    .await?;

    tracing::info!(day_id = id, business_date, "Business day opened");

    sqlx::query_as::<_, BusinessDay>(&format!(
        "SELECT {DAY_COLUMNS} FROM business_day WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| RepoError::Database("Failed to create business day".into()))
}

/// Staging rows for a PENDING_CLOSE day, for wizard recovery
pub async fn list_pending(pool: &SqlitePool, day_id: i64) -> RepoResult<Vec<PendingClosing>> {
    let rows = sqlx::query_as::<_, PendingClosing>(
        "SELECT id, day_id, pack_id, closing_counter, is_depleted FROM pending_closing WHERE day_id = ? ORDER BY id",
    )
    .bind(day_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Settlement snapshots written at commit (permanent audit rows)
pub async fn list_snapshots(pool: &SqlitePool, day_id: i64) -> RepoResult<Vec<DayUnitSnapshot>> {
    let rows = sqlx::query_as::<_, DayUnitSnapshot>(
        "SELECT id, day_id, pack_id, starting_counter, ending_counter, units_sold, sales_amount_cents FROM day_unit_snapshot WHERE day_id = ? ORDER BY id",
    )
    .bind(day_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// prepare(): stage the scanned closings and take the close-in-flight
/// gate.
///
/// Atomically writes one `pending_closing` row per entry and moves the
/// day OPEN → PENDING_CLOSE. An empty `closings` list is a valid close.
/// A second prepare while already PENDING_CLOSE fails with
/// `InvalidState`, guaranteeing at most one close-in-flight per store.
/// No inventory is mutated here.
pub async fn prepare_close(
    pool: &SqlitePool,
    day_id: i64,
    closings: &[ClosingEntry],
) -> RepoResult<PrepareTotals> {
    // Input-format validation before any mutation
    let mut seen = HashSet::new();
    for entry in closings {
        if entry.closing_counter < 0 {
            return Err(RepoError::Validation(format!(
                "Closing counter cannot be negative for pack {}",
                entry.pack_id
            )));
        }
        if !seen.insert(entry.pack_id) {
            return Err(RepoError::Validation(format!(
                "Duplicate pack {} in closing list",
                entry.pack_id
            )));
        }
    }

    let mut tx = pool.begin().await?;

    // The concurrency gate: only an OPEN day can enter PENDING_CLOSE
    let updated = sqlx::query(
        "UPDATE business_day SET status = 'PENDING_CLOSE' WHERE id = ? AND status = 'OPEN'",
    )
    .bind(day_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return match find_by_id_tx(&mut tx, day_id).await? {
            Some(_) => Err(RepoError::InvalidState(format!(
                "Business day {day_id} is not in OPEN status"
            ))),
            None => Err(RepoError::NotFound(format!(
                "Business day {day_id} not found"
            ))),
        };
    }

    let day = find_by_id_tx(&mut tx, day_id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Business day {day_id} vanished")))?;

    let mut estimated_total_cents = 0_i64;
    for entry in closings {
        let pack = find_pack_tx(&mut tx, entry.pack_id).await?.ok_or_else(|| {
            RepoError::Validation(format!("Unknown pack {} in closing list", entry.pack_id))
        })?;
        if pack.store_id != day.store_id {
            return Err(RepoError::Validation(format!(
                "Pack {} does not belong to store {}",
                entry.pack_id, day.store_id
            )));
        }

        let (_, amount_cents) = settle(
            pack.opening_counter,
            entry.closing_counter,
            pack.unit_price_cents,
        );
        estimated_total_cents += amount_cents;

        sqlx::query(
            "INSERT INTO pending_closing (id, day_id, pack_id, closing_counter, is_depleted) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(snowflake_id())
        .bind(day_id)
        .bind(entry.pack_id)
        .bind(entry.closing_counter)
        .bind(entry.is_depleted)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        day_id,
        closings = closings.len(),
        "Business day staged for close"
    );

    Ok(PrepareTotals {
        closings_count: closings.len() as i64,
        estimated_total_cents,
    })
}

/// commit(): settle the staged closings and close the day.
///
/// In one transaction: writes one settlement snapshot per staged pack,
/// flips depleted packs, persists the day aggregates, deletes the
/// staging rows, enqueues a `day_close` outbox entry (fire-and-forget,
/// see below) and auto-opens the next day for `next_business_date` so
/// the store is never left without an OPEN day.
///
/// The outbox insert runs inside a savepoint: if the enqueue fails the
/// close itself still commits and the failure is only logged.
pub async fn commit_close(
    pool: &SqlitePool,
    day_id: i64,
    actor_id: i64,
    next_business_date: &str,
) -> RepoResult<CommitOutcome> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE business_day SET status = 'CLOSED', closed_at = ?, closed_by = ? WHERE id = ? AND status = 'PENDING_CLOSE'",
    )
    .bind(now)
    .bind(actor_id)
    .bind(day_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return match find_by_id_tx(&mut tx, day_id).await? {
            Some(_) => Err(RepoError::InvalidState(format!(
                "Business day {day_id} is not in PENDING_CLOSE status"
            ))),
            None => Err(RepoError::NotFound(format!(
                "Business day {day_id} not found"
            ))),
        };
    }

    let pendings = sqlx::query_as::<_, PendingClosing>(
        "SELECT id, day_id, pack_id, closing_counter, is_depleted FROM pending_closing WHERE day_id = ? ORDER BY id",
    )
    .bind(day_id)
    .fetch_all(&mut *tx)
    .await?;

    let mut snapshots = Vec::with_capacity(pendings.len());
    let mut total_sales_cents = 0_i64;
    let mut total_units_sold = 0_i64;

    for pending in &pendings {
        let pack = find_pack_tx(&mut tx, pending.pack_id)
            .await?
            .ok_or_else(|| {
                RepoError::Database(format!("Pack {} missing at commit", pending.pack_id))
            })?;

        let (units_sold, sales_amount_cents) = settle(
            pack.opening_counter,
            pending.closing_counter,
            pack.unit_price_cents,
        );
        total_sales_cents += sales_amount_cents;
        total_units_sold += units_sold;

        let snapshot = DayUnitSnapshot {
            id: snowflake_id(),
            day_id,
            pack_id: pending.pack_id,
            starting_counter: pack.opening_counter,
            ending_counter: pending.closing_counter,
            units_sold,
            sales_amount_cents,
        };
        sqlx::query(
            "INSERT INTO day_unit_snapshot (id, day_id, pack_id, starting_counter, ending_counter, units_sold, sales_amount_cents) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snapshot.id)
        .bind(snapshot.day_id)
        .bind(snapshot.pack_id)
        .bind(snapshot.starting_counter)
        .bind(snapshot.ending_counter)
        .bind(snapshot.units_sold)
        .bind(snapshot.sales_amount_cents)
        .execute(&mut *tx)
        .await?;
        snapshots.push(snapshot);

        if pending.is_depleted {
            sqlx::query("UPDATE pack SET status = 'DEPLETED' WHERE id = ?")
                .bind(pending.pack_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    sqlx::query(
        "UPDATE business_day SET total_sales_cents = ?, total_units_sold = ? WHERE id = ?",
    )
    .bind(total_sales_cents)
    .bind(total_units_sold)
    .bind(day_id)
    .execute(&mut *tx)
    .await?;

    // Staging data has no further use
    sqlx::query("DELETE FROM pending_closing WHERE day_id = ?")
        .bind(day_id)
        .execute(&mut *tx)
        .await?;

    let day = find_by_id_tx(&mut tx, day_id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Business day {day_id} vanished")))?;

    // Replication handoff — must never unwind the close
    let enqueue = OutboxEnqueue {
        entity_type: "day_close".to_string(),
        entity_id: day_id,
        operation: "upsert".to_string(),
        payload: serde_json::json!({
            "day_id": day.id,
            "store_id": day.store_id,
            "business_date": day.business_date,
            "closed_at": day.closed_at,
            "closed_by": day.closed_by,
            "total_sales_cents": day.total_sales_cents,
            "total_units_sold": day.total_units_sold,
            "snapshot_count": snapshots.len(),
        }),
        priority: 10,
    };
    match outbox::enqueue_in(&mut tx, &enqueue).await {
        outbox::OutboxWriteResult::Enqueued(outbox_id) => {
            tracing::debug!(day_id, outbox_id, "day_close queued for replication");
        }
        outbox::OutboxWriteResult::Failed(err) => {
            tracing::error!(day_id, "Outbox enqueue failed, day close kept: {err}");
        }
    }

    // Auto-reopen: the store is never left without an OPEN day.
    // "Today" comes from the wall clock, not the closed day's date.
    let next_day = get_or_create_tx(&mut tx, day.store_id, next_business_date, actor_id).await?;

    tx.commit().await?;

    tracing::info!(
        day_id,
        total_sales_cents,
        total_units_sold,
        next_day_id = next_day.id,
        "Business day closed"
    );

    Ok(CommitOutcome {
        day,
        snapshots,
        next_day,
    })
}

/// cancel(): discard the staged closings and return to OPEN.
///
/// Touches nothing but the staging rows and the status; packs, shifts
/// and prior snapshots are untouched. Always available after a restart
/// until commit succeeds.
pub async fn cancel_close(pool: &SqlitePool, day_id: i64) -> RepoResult<BusinessDay> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE business_day SET status = 'OPEN' WHERE id = ? AND status = 'PENDING_CLOSE'",
    )
    .bind(day_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return match find_by_id_tx(&mut tx, day_id).await? {
            Some(_) => Err(RepoError::InvalidState(format!(
                "Business day {day_id} is not in PENDING_CLOSE status"
            ))),
            None => Err(RepoError::NotFound(format!(
                "Business day {day_id} not found"
            ))),
        };
    }

    sqlx::query("DELETE FROM pending_closing WHERE day_id = ?")
        .bind(day_id)
        .execute(&mut *tx)
        .await?;

    let day = find_by_id_tx(&mut tx, day_id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Business day {day_id} vanished")))?;

    tx.commit().await?;

    tracing::info!(day_id, "Business day close cancelled");
    Ok(day)
}

async fn find_by_id_tx(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<BusinessDay>> {
    let day = sqlx::query_as::<_, BusinessDay>(&format!(
        "SELECT {DAY_COLUMNS} FROM business_day WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(day)
}

async fn find_pack_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Pack>> {
    let pack = sqlx::query_as::<_, Pack>(
        "SELECT id, store_id, bin_id, opening_counter, unit_price_cents, status, created_at FROM pack WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(pack)
}
