//! 存储接口 Trait 定义
//!
//! - ping：最小化的存活查询，只用于启动就绪检查
//! - provision_schema：幂等建表（每次启动都会调用）
//! - insert：单条记录写入，失败不重试，直接返回给调用方

use crate::error::StorageError;
use async_trait::async_trait;
use domain::MeasurementRecord;

/// 温度测量存储接口
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// 存活检查
    async fn ping(&self) -> Result<(), StorageError>;

    /// 建表、转换为按时间分区的结构、建立设备+时间索引
    async fn provision_schema(&self) -> Result<(), StorageError>;

    /// 追加一条测量记录（独立的原子写入单元）
    async fn insert(&self, record: &MeasurementRecord) -> Result<(), StorageError>;
}
