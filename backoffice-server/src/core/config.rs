use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::utils::time;

/// 服务器配置 - 后台节点的所有配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/backoffice | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | STORE_ID | 1 | 本节点所属门店 |
/// | TIMEZONE | Europe/Madrid | 业务时区 |
/// | BUSINESS_DAY_CUTOFF | 02:00 | 营业日分界时间 (HH:MM) |
/// | CLOUD_SYNC_URL | (empty) | 云同步地址，为空则仅入队不推送 |
/// | SYNC_INTERVAL_SECS | 60 | 同步队列扫描间隔 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 本节点所属门店 ID
    pub store_id: i64,
    /// 业务时区
    pub timezone: Tz,
    /// 营业日分界时间
    pub business_day_cutoff: NaiveTime,
    /// 云同步地址 (空字符串 = 不推送)
    pub cloud_sync_url: String,
    /// 同步队列扫描间隔 (秒)
    pub sync_interval_secs: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(chrono_tz::Europe::Madrid);
        let cutoff = std::env::var("BUSINESS_DAY_CUTOFF")
            .map(|c| time::parse_cutoff(&c))
            .unwrap_or_else(|_| time::parse_cutoff("02:00"));

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/backoffice".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            store_id: std::env::var("STORE_ID")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1),
            timezone,
            business_day_cutoff: cutoff,
            cloud_sync_url: std::env::var("CLOUD_SYNC_URL").unwrap_or_default(),
            sync_interval_secs: std::env::var("SYNC_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16, store_id: i64) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.store_id = store_id;
        config
    }

    /// 数据库文件路径
    pub fn db_path(&self) -> String {
        format!("{}/backoffice.db", self.work_dir)
    }
}
