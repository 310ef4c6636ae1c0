//! HTTP API 路由
//!
//! 每个资源一个子模块 (`mod.rs` 路由 + `handler.rs` 处理器)，
//! 统一挂载在 `/api/...` 下。

pub mod access;
pub mod days;
pub mod health;
pub mod operators;
pub mod packs;
pub mod shifts;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(days::router())
        .merge(access::router())
        .merge(shifts::router())
        .merge(operators::router())
        .merge(packs::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
