use domain::{DecodedPayload, MeasurementRecord, RawEvent};
use iot_normalize::normalize;
use iot_storage::{MeasurementStore, StorageError};
use serde_json::Value;
use std::sync::Arc;

/// Pipeline 处理错误（单条消息级，可恢复）。
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("payload is not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not a json object (got {0})")]
    NotAnObject(&'static str),
    #[error("store error: {0}")]
    Store(#[from] StorageError),
}

impl PipelineError {
    /// 解码阶段的失败（相对于写入失败）。
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Utf8(_) | Self::Json(_) | Self::NotAnObject(_))
    }
}

/// 将报文字节解码为键值映射。
///
/// 超出 f64 范围的数字（如 `1e400`）按解码失败处理：无法以有限数值写入 JSONB。
pub fn decode_payload(bytes: &[u8]) -> Result<DecodedPayload, PipelineError> {
    let text = std::str::from_utf8(bytes)?;
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        Value::Null => Err(PipelineError::NotAnObject("null")),
        Value::Bool(_) => Err(PipelineError::NotAnObject("bool")),
        Value::Number(_) => Err(PipelineError::NotAnObject("number")),
        Value::String(_) => Err(PipelineError::NotAnObject("string")),
        Value::Array(_) => Err(PipelineError::NotAnObject("array")),
    }
}

/// 单条消息处理链路：解码 -> 标准化 -> 写入。
///
/// 每条成功解码的消息恰好产生一条记录、一次写入尝试；记录写入后即丢弃。
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn MeasurementStore>,
}

impl Pipeline {
    pub fn new(store: Arc<dyn MeasurementStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, event: RawEvent) -> Result<MeasurementRecord, PipelineError> {
        let payload = decode_payload(&event.payload)?;
        let record = normalize(payload);
        self.store.insert(&record).await?;
        Ok(record)
    }
}
