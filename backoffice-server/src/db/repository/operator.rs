//! Operator Repository
//!
//! PIN credentials are stored as Argon2 hashes; verification goes
//! through [`verify_pin`] so the comparison cost is uniform whether or
//! not the operator exists.

use super::{RepoError, RepoResult};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};
use shared::models::{Operator, OperatorCreate, OperatorUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const OPERATOR_COLUMNS: &str = "id, store_id, name, role, pin_hash, active, created_at";

/// Hash a PIN with Argon2 (same scheme as the terminal login)
pub fn hash_pin(pin: &str) -> RepoResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| RepoError::Database(format!("Failed to hash PIN: {e}")))
}

/// Timing-uniform PIN check against a stored hash
pub fn verify_pin(pin: &str, pin_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(pin_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(pin.as_bytes(), &parsed)
        .is_ok()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Operator>> {
    let operator = sqlx::query_as::<_, Operator>(&format!(
        "SELECT {OPERATOR_COLUMNS} FROM operator WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(operator)
}

/// Active operators for a store, the guard's candidate set
pub async fn find_active_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Operator>> {
    let operators = sqlx::query_as::<_, Operator>(&format!(
        "SELECT {OPERATOR_COLUMNS} FROM operator WHERE store_id = ? AND active = 1 ORDER BY name"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(operators)
}

pub async fn find_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Operator>> {
    let operators = sqlx::query_as::<_, Operator>(&format!(
        "SELECT {OPERATOR_COLUMNS} FROM operator WHERE store_id = ? ORDER BY name"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(operators)
}

pub async fn create(pool: &SqlitePool, store_id: i64, data: OperatorCreate) -> RepoResult<Operator> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("name is required".into()));
    }
    let pin_hash = hash_pin(&data.pin)?;

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO operator (id, store_id, name, role, pin_hash, active, created_at) VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(store_id)
    .bind(&data.name)
    .bind(data.role)
    .bind(pin_hash)
    .bind(now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create operator".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: OperatorUpdate) -> RepoResult<Operator> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Operator {id} not found")))?;

    let pin_hash = match data.pin {
        Some(ref pin) => hash_pin(pin)?,
        None => existing.pin_hash.clone(),
    };

    sqlx::query(
        "UPDATE operator SET name = COALESCE(?, name), role = COALESCE(?, role), pin_hash = ?, active = COALESCE(?, active) WHERE id = ?",
    )
    .bind(data.name)
    .bind(data.role)
    .bind(pin_hash)
    .bind(data.active)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Operator {id} not found")))
}
