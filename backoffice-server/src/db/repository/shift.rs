//! Shift Repository

use super::{RepoError, RepoResult};
use shared::models::{Shift, ShiftOpen};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const SHIFT_COLUMNS: &str = "id, store_id, business_date, shift_number, status, assigned_operator_id, terminal_id, start_time, end_time, note";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Shift>> {
    let shift =
        sqlx::query_as::<_, Shift>(&format!("SELECT {SHIFT_COLUMNS} FROM shift WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(shift)
}

/// All OPEN shifts for a store. The access guard derives its
/// shift-condition check from this list on every attempt.
pub async fn find_open_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Shift>> {
    let shifts = sqlx::query_as::<_, Shift>(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shift WHERE store_id = ? AND status = 'OPEN' ORDER BY start_time"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(shifts)
}

pub async fn find_by_date(
    pool: &SqlitePool,
    store_id: i64,
    business_date: &str,
) -> RepoResult<Vec<Shift>> {
    let shifts = sqlx::query_as::<_, Shift>(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shift WHERE store_id = ? AND business_date = ? ORDER BY shift_number"
    ))
    .bind(store_id)
    .bind(business_date)
    .fetch_all(pool)
    .await?;
    Ok(shifts)
}

/// Open a shift (开班). One OPEN session per terminal; the shift number
/// is the next in the store+date sequence.
pub async fn open(
    pool: &SqlitePool,
    store_id: i64,
    business_date: &str,
    data: ShiftOpen,
) -> RepoResult<Shift> {
    if data.terminal_id.trim().is_empty() {
        return Err(RepoError::Validation("terminal_id is required".into()));
    }

    let mut tx = pool.begin().await?;

    let already_open: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM shift WHERE store_id = ? AND terminal_id = ? AND status = 'OPEN'",
    )
    .bind(store_id)
    .bind(&data.terminal_id)
    .fetch_one(&mut *tx)
    .await?;
    if already_open > 0 {
        return Err(RepoError::Duplicate(format!(
            "Terminal {} already has an open shift",
            data.terminal_id
        )));
    }

    let next_number: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(shift_number), 0) + 1 FROM shift WHERE store_id = ? AND business_date = ?",
    )
    .bind(store_id)
    .bind(business_date)
    .fetch_one(&mut *tx)
    .await?;

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO shift (id, store_id, business_date, shift_number, status, assigned_operator_id, terminal_id, start_time, note) VALUES (?, ?, ?, ?, 'OPEN', ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(store_id)
    .bind(business_date)
    .bind(next_number)
    .bind(data.assigned_operator_id)
    .bind(&data.terminal_id)
    .bind(now_millis())
    .bind(data.note)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create shift".into()))
}

/// Close a shift (收班). Guarded by `status = 'OPEN'`.
pub async fn close(pool: &SqlitePool, id: i64, note: Option<String>) -> RepoResult<Shift> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE shift SET status = 'CLOSED', end_time = ?, note = COALESCE(?, note) WHERE id = ? AND status = 'OPEN'",
    )
    .bind(now)
    .bind(note)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Shift {id} not found or already closed"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Shift {id} not found")))
}
