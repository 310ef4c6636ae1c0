//! Backoffice Server - 彩票零售门店后台节点
//!
//! # 架构概述
//!
//! 本模块是门店后台服务的主入口，提供以下核心功能：
//!
//! - **营业日关闭** (`closeout`): prepare/commit/cancel 生命周期 + 权限检查
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx)
//! - **云同步** (`sync`): outbox 队列后台推送
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! backoffice-server/src/
//! ├── core/          # 配置、状态、服务器引导
//! ├── closeout/      # 营业日生命周期 + access guard
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (repository)
//! ├── sync/          # outbox 同步 worker
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod closeout;
pub mod core;
pub mod db;
pub mod sync;
pub mod utils;

// Re-export 公共类型
pub use closeout::{AccessGuard, DayCloseService};
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/backoffice".into());
    let log_dir = format!("{work_dir}/logs");
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {log_dir}: {e}"))?;

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    init_logger_with_file(Some(&log_level), Some(&log_dir));
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____             __        ________
   / __ )____ ______/ /_______/ __/ __/
  / __  / __ `/ ___/ //_/ __ \/ /_/ /_
 / /_/ / /_/ / /__/ ,< / /_/ / __/ __/
/_____/\__,_/\___/_/|_|\____/_/ /_/
        "#
    );
}
