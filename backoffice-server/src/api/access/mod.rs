//! Access Guard API 模块 (关闭日权限检查)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/access/check", post(handler::check))
}
