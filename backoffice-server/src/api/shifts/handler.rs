//! Shift API Handlers
//!
//! Shifts belong to the business date in effect at open time (cutoff
//! aware), not the calendar date.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::shift;
use crate::utils::{AppError, AppResult, time};
use shared::models::{Shift, ShiftCloseRequest, ShiftOpen};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// YYYY-MM-DD; defaults to the current business date
    pub business_date: Option<String>,
}

/// GET /api/shifts?business_date=YYYY-MM-DD - 按营业日列出班次
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Shift>>> {
    let date = match query.business_date {
        Some(date) => {
            time::parse_date(&date)?;
            date
        }
        None => current_business_date(&state),
    };
    let shifts = shift::find_by_date(&state.pool, state.config.store_id, &date).await?;
    Ok(Json(shifts))
}

/// GET /api/shifts/open - 当前所有 OPEN 班次
pub async fn list_open(State(state): State<ServerState>) -> AppResult<Json<Vec<Shift>>> {
    let shifts = shift::find_open_by_store(&state.pool, state.config.store_id).await?;
    Ok(Json(shifts))
}

/// GET /api/shifts/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Shift>> {
    let found = shift::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Shift {} not found", id)))?;
    Ok(Json(found))
}

/// POST /api/shifts - 开班
pub async fn open(
    State(state): State<ServerState>,
    Json(payload): Json<ShiftOpen>,
) -> AppResult<Json<Shift>> {
    let date = current_business_date(&state);
    let opened = shift::open(&state.pool, state.config.store_id, &date, payload).await?;
    Ok(Json(opened))
}

/// POST /api/shifts/:id/close - 收班
pub async fn close(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ShiftCloseRequest>,
) -> AppResult<Json<Shift>> {
    let closed = shift::close(&state.pool, id, payload.note).await?;
    Ok(Json(closed))
}

fn current_business_date(state: &ServerState) -> String {
    time::current_business_date(state.config.business_day_cutoff, state.config.timezone)
        .format("%Y-%m-%d")
        .to_string()
}
