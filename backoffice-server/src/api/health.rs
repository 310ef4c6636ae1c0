//! Health check endpoint

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::db::repository::outbox;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

async fn health(State(state): State<ServerState>) -> AppResult<Json<Value>> {
    let outbox_backlog = outbox::count_pending(&state.pool).await?;
    Ok(Json(json!({
        "status": "ok",
        "store_id": state.config.store_id,
        "outbox_backlog": outbox_backlog,
    })))
}
