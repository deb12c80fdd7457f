//! # IoT Storage 模块
//!
//! 温度测量的持久化层：连接管理、就绪检查、幂等建表与单条写入。
//!
//! ## 模块说明
//!
//! - [`traits`]：`MeasurementStore` 接口（ping / provision_schema / insert）
//! - [`readiness`]：启动时的有界重试就绪检查 `wait_until_ready`
//! - [`schema`]：表结构与 DDL 语句
//! - [`error`]：存储错误类型
//! - [`connection`]：延迟建连的单会话连接池
//! - [`postgres`]：TimescaleDB 实现（生产环境）
//! - [`in_memory`]：内存实现（测试）
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use iot_storage::{MeasurementStore, PgMeasurementStore, PgSettings, wait_until_ready};
//! use std::time::Duration;
//!
//! let store = PgMeasurementStore::connect_lazy(&settings);
//! wait_until_ready(&store, 60, Duration::from_secs(2)).await?;
//! store.provision_schema().await?;
//! store.insert(&record).await?;
//! ```
//!
//! ## 失败语义
//!
//! - 就绪检查耗尽是唯一的致命错误，由调用方终止进程
//! - 写入失败不重试，作为单点失败交给调用方

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod postgres;
pub mod readiness;
pub mod schema;
pub mod traits;

pub use connection::*;
pub use error::*;
pub use readiness::*;
pub use traits::*;

pub use in_memory::InMemoryMeasurementStore;
pub use postgres::PgMeasurementStore;
