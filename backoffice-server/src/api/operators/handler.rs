//! Operator API Handlers
//!
//! PIN policy (4-6 digits) is enforced here at the boundary; the
//! repository only ever sees hashes.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::closeout::guard::is_valid_pin_format;
use crate::core::ServerState;
use crate::db::repository::operator;
use crate::utils::{AppError, AppResult};
use shared::models::{Operator, OperatorCreate, OperatorUpdate};

/// GET /api/operators - 门店所有员工 (含停用)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Operator>>> {
    let operators = operator::find_by_store(&state.pool, state.config.store_id).await?;
    Ok(Json(operators))
}

/// GET /api/operators/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Operator>> {
    let found = operator::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Operator {} not found", id)))?;
    Ok(Json(found))
}

/// POST /api/operators - 创建员工
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OperatorCreate>,
) -> AppResult<Json<Operator>> {
    if !is_valid_pin_format(&payload.pin) {
        return Err(AppError::validation("PIN must be 4-6 digits"));
    }
    let created = operator::create(&state.pool, state.config.store_id, payload).await?;
    Ok(Json(created))
}

/// PUT /api/operators/:id - 更新员工 (换 PIN / 改角色 / 停用)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OperatorUpdate>,
) -> AppResult<Json<Operator>> {
    if let Some(ref pin) = payload.pin {
        if !is_valid_pin_format(pin) {
            return Err(AppError::validation("PIN must be 4-6 digits"));
        }
    }
    let updated = operator::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}
