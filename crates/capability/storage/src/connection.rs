//! 数据库连接管理
//!
//! 连接池延迟建立：启动时数据库可能尚未就绪，
//! 首次查询（就绪检查）时才真正建连。
//! 整个进程只使用一个会话，消息逐条串行写入。

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;

/// Postgres 连接参数
#[derive(Debug, Clone)]
pub struct PgSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl PgSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

/// 建立延迟连接的单会话连接池
///
/// 不会立即连接数据库，因此数据库未启动时也不会失败。
pub fn connect_lazy(settings: &PgSettings) -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy_with(settings.connect_options())
}
