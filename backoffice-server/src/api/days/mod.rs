//! Business Day API 模块 (营业日关闭流程)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/days", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/current", get(handler::get_current))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/summary", get(handler::get_summary))
        .route("/{id}/pending", get(handler::get_pending))
        .route("/{id}/close/prepare", post(handler::prepare_close))
        .route("/{id}/close/commit", post(handler::commit_close))
        .route("/{id}/close/cancel", post(handler::cancel_close))
}
