//! 采集链路装配模块
//!
//! 将采集源（MQTT）、处理链路（解码 → 标准化 → 写入）与存储组装在一起，
//! 并负责严格有序的启动流程：等待存储就绪 → 建表 → 订阅并进入接收循环。

use iot_config::IngestorConfig;
use iot_ingest::{IngestError, MqttSource, MqttSourceConfig, RawEventHandler, Source};
use iot_pipeline::Pipeline;
use iot_storage::{MeasurementStore, StorageError, wait_until_ready};
use iot_telemetry::{metrics, record_decode_failure, record_write_failure, record_write_success};
use std::sync::Arc;
use tracing::{debug, info};

/// 启动阶段的致命错误。
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("store readiness failed: {0}")]
    NotReady(#[source] StorageError),
    #[error("schema provisioning failed: {0}")]
    Schema(#[source] StorageError),
    #[error("ingest source stopped: {0}")]
    Source(#[from] IngestError),
}

/// 流水线处理器
///
/// 实现 `RawEventHandler`，把每条原始消息交给 `Pipeline`，
/// 记录结果与计数后把失败原样返回给采集源（由采集源记录并继续）。
pub struct PipelineHandler {
    pipeline: Pipeline,
}

impl PipelineHandler {
    pub fn new(store: Arc<dyn MeasurementStore>) -> Self {
        Self {
            pipeline: Pipeline::new(store),
        }
    }
}

#[async_trait::async_trait]
impl RawEventHandler for PipelineHandler {
    async fn handle(&self, event: domain::RawEvent) -> Result<(), IngestError> {
        let topic = event.topic.clone();
        let payload_size = event.payload.len();

        match self.pipeline.handle(event).await {
            Ok(record) => {
                record_write_success();
                info!(
                    target: "iot.ingest",
                    topic = %topic,
                    device_eui = %record.device_id,
                    temperature_c = ?record.temperature_c,
                    received_at = %record.received_at.to_rfc3339(),
                    "measurement_stored"
                );
                Ok(())
            }
            Err(err) => {
                if err.is_decode() {
                    record_decode_failure();
                } else {
                    record_write_failure();
                }
                // 告警由采集源的 dispatch 统一输出，这里只补充计数。
                let snapshot = metrics().snapshot();
                debug!(
                    target: "iot.ingest",
                    topic = %topic,
                    payload_size,
                    error = %err,
                    decode_failures = snapshot.decode_failures,
                    write_failures = snapshot.write_failure,
                    "measurement_dropped"
                );
                Err(IngestError::Handler(err.to_string()))
            }
        }
    }
}

/// 由配置构造 MQTT 采集源配置
pub fn mqtt_source_config(config: &IngestorConfig) -> MqttSourceConfig {
    let client_id = config
        .mqtt_client_id
        .clone()
        .unwrap_or_else(|| format!("iot-ingestor-{}", uuid::Uuid::new_v4()));
    MqttSourceConfig {
        host: config.mqtt_host.clone(),
        port: config.mqtt_port,
        topic: config.mqtt_topic.clone(),
        client_id,
        keep_alive: config.mqtt_keep_alive(),
        reconnect_delay: config.mqtt_reconnect_delay(),
    }
}

/// 启动接入服务
///
/// 每一步都是下一步的前提：
/// 1. 等待存储就绪（耗尽即致命）
/// 2. 幂等建表（失败即致命）
/// 3. 运行采集源（正常情况下不会返回）
pub async fn run_ingestor(
    config: &IngestorConfig,
    store: Arc<dyn MeasurementStore>,
    source: Arc<dyn Source>,
) -> Result<(), StartupError> {
    wait_until_ready(
        store.as_ref(),
        config.db_ready_max_attempts,
        config.db_ready_delay(),
    )
    .await
    .map_err(StartupError::NotReady)?;

    store
        .provision_schema()
        .await
        .map_err(StartupError::Schema)?;

    let handler: Arc<dyn RawEventHandler> = Arc::new(PipelineHandler::new(store));
    source.run(handler).await?;
    Ok(())
}

/// 构造生产环境的 MQTT 采集源
pub fn mqtt_source(config: &IngestorConfig) -> Arc<dyn Source> {
    let mqtt_config = mqtt_source_config(config);
    info!(
        target: "iot.ingest",
        "ingest source: mqtt {}:{} topic={}",
        mqtt_config.host, mqtt_config.port, mqtt_config.topic
    );
    Arc::new(MqttSource::new(mqtt_config))
}
