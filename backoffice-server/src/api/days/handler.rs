//! Business Day API Handlers
//!
//! The wizard drives prepare → commit (or cancel) through these
//! endpoints. `actor_id` arrives explicitly from the caller's session
//! layer; the server keeps no ambient current-user state.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::models::{
    BusinessDay, DayCloseCommit, DayCloseEstimate, DayClosePrepare, DayCloseSummary,
    PendingClosing,
};

#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub actor_id: i64,
}

/// GET /api/days/current - 当前营业日 (不存在则按 cutoff 创建今日)
pub async fn get_current(
    State(state): State<ServerState>,
    Query(query): Query<ActorQuery>,
) -> AppResult<Json<BusinessDay>> {
    let day = state.day_close.current_day(query.actor_id).await?;
    Ok(Json(day))
}

/// GET /api/days/:id - 获取营业日
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BusinessDay>> {
    let day = state
        .day_close
        .get_day(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Business day {} not found", id)))?;
    Ok(Json(day))
}

/// GET /api/days/:id/summary - 结算汇总 (关闭后审计视图)
pub async fn get_summary(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DayCloseSummary>> {
    let summary = state
        .day_close
        .summary(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Business day {} not found", id)))?;
    Ok(Json(summary))
}

/// GET /api/days/:id/pending - 暂存的关闭条目 (向导崩溃恢复)
pub async fn get_pending(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<PendingClosing>>> {
    let pending = state.day_close.pending_closings(id).await?;
    Ok(Json(pending))
}

/// POST /api/days/:id/close/prepare - 暂存关闭数据并锁定营业日
pub async fn prepare_close(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DayClosePrepare>,
) -> AppResult<Json<DayCloseEstimate>> {
    let estimate = state.day_close.prepare(id, &payload.closings).await?;
    Ok(Json(estimate))
}

/// POST /api/days/:id/close/commit - 结算并关闭营业日
pub async fn commit_close(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DayCloseCommit>,
) -> AppResult<Json<DayCloseSummary>> {
    let summary = state.day_close.commit(id, payload.actor_id).await?;
    Ok(Json(summary))
}

/// POST /api/days/:id/close/cancel - 丢弃暂存数据并回到 OPEN
pub async fn cancel_close(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BusinessDay>> {
    let day = state.day_close.cancel(id).await?;
    Ok(Json(day))
}
