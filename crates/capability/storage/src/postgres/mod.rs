//! # PostgreSQL 存储实现模块
//!
//! 生产环境使用的 TimescaleDB 写入实现。
//!
//! ## 数据库模式
//!
//! - `temperature_measurements`：id, device_eui, temperature_c, received_at, raw(jsonb)
//! - 按 `received_at` 转换为 hypertable
//! - `idx_temperature_measurements_device_time`：(device_eui, received_at desc)
//!
//! ## 写入
//!
//! - 每次 `insert` 单独执行、自动提交，不做批量、不做事务合并
//! - 参数化绑定；`raw` 以 JSONB 存储，可直接查询
//! - 写入失败不重试，错误交给调用方记录

pub mod measurement;

pub use measurement::*;
