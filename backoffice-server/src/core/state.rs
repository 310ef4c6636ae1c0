use sqlx::SqlitePool;

use crate::closeout::{AccessGuard, DayCloseService};
use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | day_close | 营业日关闭生命周期服务 |
/// | guard | 关闭权限检查 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub day_close: DayCloseService,
    pub guard: AccessGuard,
}

impl ServerState {
    /// 初始化数据库与领域服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.db_path()).await?;
        Ok(Self::with_pool(config.clone(), db.pool))
    }

    /// Build state over an existing pool (tests use an in-memory pool)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let day_close = DayCloseService::new(
            pool.clone(),
            config.store_id,
            config.business_day_cutoff,
            config.timezone,
        );
        let guard = AccessGuard::new(pool.clone(), config.store_id);
        Self {
            config,
            pool,
            day_close,
            guard,
        }
    }
}
