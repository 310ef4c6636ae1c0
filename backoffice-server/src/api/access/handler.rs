//! Access Guard API Handler

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{AccessCheckRequest, AccessDecision};

/// POST /api/access/check - PIN 认证 + 班次条件检查
///
/// Denial comes back as a 200 with `allowed: false`; only
/// infrastructure failures produce an error status.
pub async fn check(
    State(state): State<ServerState>,
    Json(payload): Json<AccessCheckRequest>,
) -> AppResult<Json<AccessDecision>> {
    let decision = state.guard.check_access(&payload.pin).await?;
    Ok(Json(decision))
}
