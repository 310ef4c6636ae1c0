//! 服务器引导 - HTTP 服务 + 后台任务
//!
//! `Server::run()` 启动 axum 服务并拉起同步 worker，
//! Ctrl-C 时先取消后台任务再优雅关闭。

use tokio_util::sync::CancellationToken;

use crate::api;
use crate::core::{Config, ServerState};
use crate::sync::{SyncService, SyncWorker};
use crate::utils::AppError;

pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// 启动 HTTP 服务器与后台任务，直到收到关闭信号
    pub async fn run(self) -> Result<(), AppError> {
        let shutdown = CancellationToken::new();

        // 后台同步 worker（未配置 CLOUD_SYNC_URL 时仅入队不推送）
        let worker_handle = if self.config.cloud_sync_url.is_empty() {
            tracing::info!("CLOUD_SYNC_URL not set, outbox drain worker disabled");
            None
        } else {
            let service = SyncService::new(
                self.config.cloud_sync_url.clone(),
                self.config.store_id,
            )?;
            let worker = SyncWorker::new(
                self.state.pool.clone(),
                service,
                self.config.sync_interval_secs,
                shutdown.clone(),
            );
            Some(tokio::spawn(worker.run()))
        };

        let router = api::router(self.state.clone());
        let addr = format!("0.0.0.0:{}", self.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

        tracing::info!("HTTP server listening on {addr}");

        let serve_shutdown = shutdown.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                    }
                    _ = serve_shutdown.cancelled() => {}
                }
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        // 先停后台任务再退出
        shutdown.cancel();
        if let Some(handle) = worker_handle {
            let _ = handle.await;
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}
