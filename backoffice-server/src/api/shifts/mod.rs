//! Shift API 模块 (开班/收班)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/shifts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::open))
        .route("/open", get(handler::list_open))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/close", post(handler::close))
}
