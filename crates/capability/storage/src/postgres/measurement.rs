//! Postgres / TimescaleDB 测量写入实现

use crate::connection::{PgSettings, connect_lazy};
use crate::error::StorageError;
use crate::schema::{
    CREATE_DEVICE_TIME_INDEX, CREATE_HYPERTABLE, CREATE_TABLE, INSERT_MEASUREMENT,
    TIMESCALE_INSTALLED, should_create_hypertable,
};
use crate::traits::MeasurementStore;
use domain::MeasurementRecord;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{info, warn};

pub struct PgMeasurementStore {
    pub pool: PgPool,
    require_timescale: bool,
}

impl PgMeasurementStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            require_timescale: true,
        }
    }

    /// 延迟建连；真正的连接发生在第一次 `ping`。
    pub fn connect_lazy(settings: &PgSettings) -> Self {
        Self::new(connect_lazy(settings))
    }

    /// 为 false 时，缺少 timescaledb 扩展只告警并保留普通表。
    pub fn with_require_timescale(mut self, require_timescale: bool) -> Self {
        self.require_timescale = require_timescale;
        self
    }

    async fn timescale_installed(&self) -> Result<bool, StorageError> {
        let installed: bool = sqlx::query_scalar(TIMESCALE_INSTALLED)
            .fetch_one(&self.pool)
            .await?;
        Ok(installed)
    }
}

#[async_trait::async_trait]
impl MeasurementStore for PgMeasurementStore {
    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("select 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn provision_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;

        let installed = if self.require_timescale {
            None
        } else {
            Some(self.timescale_installed().await?)
        };
        if should_create_hypertable(self.require_timescale, installed) {
            sqlx::query(CREATE_HYPERTABLE).execute(&self.pool).await?;
        } else {
            warn!(target: "iot.storage", "timescaledb_missing_hypertable_skipped");
        }

        sqlx::query(CREATE_DEVICE_TIME_INDEX)
            .execute(&self.pool)
            .await?;
        info!(target: "iot.storage", "schema_provisioned");
        Ok(())
    }

    async fn insert(&self, record: &MeasurementRecord) -> Result<(), StorageError> {
        sqlx::query(INSERT_MEASUREMENT)
            .bind(&record.device_id)
            .bind(record.temperature_c)
            .bind(record.received_at)
            .bind(Json(&record.raw))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
