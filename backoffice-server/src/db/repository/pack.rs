//! Pack Repository

use super::{RepoError, RepoResult};
use shared::models::{Pack, PackCreate, PackStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const PACK_COLUMNS: &str = "id, store_id, bin_id, opening_counter, unit_price_cents, status, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Pack>> {
    let pack = sqlx::query_as::<_, Pack>(&format!("SELECT {PACK_COLUMNS} FROM pack WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(pack)
}

pub async fn find_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Pack>> {
    let packs = sqlx::query_as::<_, Pack>(&format!(
        "SELECT {PACK_COLUMNS} FROM pack WHERE store_id = ? ORDER BY bin_id, created_at"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(packs)
}

/// Active packs in a bin (one per bin at rest, but the ledger does not
/// enforce it — report ingestion may stage a replacement pack)
pub async fn find_active_by_bin(
    pool: &SqlitePool,
    store_id: i64,
    bin_id: i64,
) -> RepoResult<Vec<Pack>> {
    let packs = sqlx::query_as::<_, Pack>(&format!(
        "SELECT {PACK_COLUMNS} FROM pack WHERE store_id = ? AND bin_id = ? AND status = 'ACTIVE' ORDER BY created_at"
    ))
    .bind(store_id)
    .bind(bin_id)
    .fetch_all(pool)
    .await?;
    Ok(packs)
}

pub async fn create(pool: &SqlitePool, store_id: i64, data: PackCreate) -> RepoResult<Pack> {
    if data.opening_counter < 0 {
        return Err(RepoError::Validation(format!(
            "Opening counter cannot be negative: {}",
            data.opening_counter
        )));
    }
    if data.unit_price_cents <= 0 {
        return Err(RepoError::Validation(format!(
            "Unit price must be positive, got {} cents",
            data.unit_price_cents
        )));
    }

    let mut tx = pool.begin().await?;

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO pack (id, store_id, bin_id, opening_counter, unit_price_cents, status, created_at) VALUES (?, ?, ?, ?, ?, 'ACTIVE', ?)",
    )
    .bind(id)
    .bind(store_id)
    .bind(data.bin_id)
    .bind(data.opening_counter)
    .bind(data.unit_price_cents)
    .bind(now_millis())
    .execute(&mut *tx)
    .await?;

    // Activation rolls up on the day in flight, not at close
    sqlx::query(
        "UPDATE business_day SET total_units_activated = total_units_activated + 1 WHERE store_id = ? AND status IN ('OPEN', 'PENDING_CLOSE')",
    )
    .bind(store_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create pack".into()))
}

pub async fn set_status(pool: &SqlitePool, id: i64, status: PackStatus) -> RepoResult<Pack> {
    let rows = sqlx::query("UPDATE pack SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Pack {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Pack {id} not found")))
}
