//! 启动就绪检查
//!
//! 有界重试的阻塞门：只在启动时执行一次，不用于写入热路径。

use crate::error::StorageError;
use crate::traits::MeasurementStore;
use std::time::Duration;
use tracing::{debug, warn};

/// 反复执行存活查询，直到成功或连续失败 `max_attempts` 次。
///
/// 每次失败后都会等待 `delay` 再重试；耗尽后返回 [`StorageError::NotReady`]。
pub async fn wait_until_ready(
    store: &dyn MeasurementStore,
    max_attempts: u32,
    delay: Duration,
) -> Result<(), StorageError> {
    for attempt in 1..=max_attempts {
        match store.ping().await {
            Ok(()) => {
                debug!(target: "iot.storage", attempt, "database_ready");
                return Ok(());
            }
            Err(err) => {
                warn!(
                    target: "iot.storage",
                    attempt,
                    max_attempts,
                    error = %err,
                    "database_not_ready"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    Err(StorageError::NotReady {
        attempts: max_attempts,
    })
}
