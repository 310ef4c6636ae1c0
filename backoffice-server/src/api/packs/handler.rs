//! Pack API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::pack;
use crate::utils::{AppError, AppResult};
use shared::models::{Pack, PackCreate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict to ACTIVE packs in one bin
    pub bin_id: Option<i64>,
}

/// GET /api/packs?bin_id=N - 票包列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Pack>>> {
    let packs = match query.bin_id {
        Some(bin_id) => pack::find_active_by_bin(&state.pool, state.config.store_id, bin_id).await?,
        None => pack::find_by_store(&state.pool, state.config.store_id).await?,
    };
    Ok(Json(packs))
}

/// GET /api/packs/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Pack>> {
    let found = pack::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pack {} not found", id)))?;
    Ok(Json(found))
}

/// POST /api/packs - 登记票包 (收到报表后入账)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PackCreate>,
) -> AppResult<Json<Pack>> {
    let created = pack::create(&state.pool, state.config.store_id, payload).await?;
    Ok(Json(created))
}
