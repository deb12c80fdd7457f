//! 存储层错误类型
//!
//! 封装底层错误：
//! - SQL 执行与连接错误
//! - 启动就绪检查耗尽
//! - 测试替身的人为不可用

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store not ready after {attempts} attempts")]
    NotReady { attempts: u32 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
