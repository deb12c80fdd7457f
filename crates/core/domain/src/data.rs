use chrono::{DateTime, Utc};
use serde::Serialize;

/// 总线输入原始事件（未解码的报文字节 + 来源主题）。
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl RawEvent {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// 解码后的上行报文：键值映射，上游不保证任何字段存在。
pub type DecodedPayload = serde_json::Map<String, serde_json::Value>;

/// 无法提取设备标识时使用的占位值。
pub const UNKNOWN_DEVICE: &str = "unknown";

/// 规范化后的温度测量记录。
///
/// 构造后不可变；写入一次后即丢弃。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub device_id: String,
    pub temperature_c: Option<f64>,
    pub received_at: DateTime<Utc>,
    pub raw: DecodedPayload,
}
