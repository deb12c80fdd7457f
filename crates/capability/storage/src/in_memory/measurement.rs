//! 测量写入内存实现
//!
//! 仅用于本地测试：可模拟数据库暂不可用、写入失败等场景。

use crate::error::StorageError;
use crate::schema::provisioning_statements;
use crate::traits::MeasurementStore;
use domain::MeasurementRecord;
use std::collections::BTreeSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// 测量写入内存存储
pub struct InMemoryMeasurementStore {
    records: RwLock<Vec<MeasurementRecord>>,
    schema: RwLock<BTreeSet<&'static str>>,
    pings: AtomicU32,
    unavailable_pings: AtomicU32,
    provision_calls: AtomicU32,
    fail_device: RwLock<Option<String>>,
    offline: AtomicBool,
}

impl InMemoryMeasurementStore {
    /// 创建立即可用的存储
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            schema: RwLock::new(BTreeSet::new()),
            pings: AtomicU32::new(0),
            unavailable_pings: AtomicU32::new(0),
            provision_calls: AtomicU32::new(0),
            fail_device: RwLock::new(None),
            offline: AtomicBool::new(false),
        }
    }

    /// 前 `count` 次存活检查失败（模拟启动竞争）
    pub fn unavailable_for(self, count: u32) -> Self {
        self.unavailable_pings.store(count, Ordering::SeqCst);
        self
    }

    /// 始终不可用
    pub fn offline(self) -> Self {
        self.offline.store(true, Ordering::SeqCst);
        self
    }

    /// 指定设备的写入失败（模拟单条写入故障）
    pub fn failing_for_device(self, device_id: impl Into<String>) -> Self {
        if let Ok(mut fail_device) = self.fail_device.write() {
            *fail_device = Some(device_id.into());
        }
        self
    }

    /// 当前累计的记录数
    pub fn len(&self) -> usize {
        self.records.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 已写入记录的副本（按写入顺序）
    pub fn records(&self) -> Vec<MeasurementRecord> {
        self.records.read().map(|v| v.clone()).unwrap_or_default()
    }

    /// 已执行过的 DDL 集合
    pub fn schema(&self) -> Vec<&'static str> {
        self.schema
            .read()
            .map(|v| v.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn ping_count(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn provision_count(&self) -> u32 {
        self.provision_calls.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryMeasurementStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MeasurementStore for InMemoryMeasurementStore {
    async fn ping(&self) -> Result<(), StorageError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("connection refused"));
        }
        let remaining = self.unavailable_pings.load(Ordering::SeqCst);
        if remaining > 0 {
            self.unavailable_pings.store(remaining - 1, Ordering::SeqCst);
            return Err(StorageError::unavailable("the database system is starting up"));
        }
        Ok(())
    }

    async fn provision_schema(&self) -> Result<(), StorageError> {
        self.provision_calls.fetch_add(1, Ordering::SeqCst);
        let mut schema = self
            .schema
            .write()
            .map_err(|_| StorageError::unavailable("lock failed"))?;
        schema.extend(provisioning_statements());
        Ok(())
    }

    async fn insert(&self, record: &MeasurementRecord) -> Result<(), StorageError> {
        let failing = self
            .fail_device
            .read()
            .map_err(|_| StorageError::unavailable("lock failed"))?;
        if failing.as_deref() == Some(record.device_id.as_str()) {
            return Err(StorageError::unavailable("insert rejected"));
        }
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::unavailable("lock failed"))?;
        records.push(record.clone());
        Ok(())
    }
}
