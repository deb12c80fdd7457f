//! 接入服务运行配置加载。

use std::env;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 接入服务运行配置。
///
/// 启动时构造一次，显式传给各组件的构造函数。
#[derive(Debug, Clone)]
pub struct IngestorConfig {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_topic: String,
    pub mqtt_client_id: Option<String>,
    pub mqtt_keep_alive_seconds: u64,
    pub mqtt_reconnect_delay_seconds: u64,
    pub pg_host: String,
    pub pg_port: u16,
    pub pg_database: String,
    pub pg_user: String,
    pub pg_password: String,
    pub db_ready_max_attempts: u32,
    pub db_ready_delay_seconds: u64,
    pub require_timescale: bool,
}

impl IngestorConfig {
    /// 从环境变量读取配置（全部可选，缺省取部署默认值）。
    pub fn from_env() -> Result<Self, ConfigError> {
        let mqtt_host = read_string_with_default("MQTT_BROKER", "mosquitto");
        let mqtt_port = read_u16_with_default("MQTT_PORT", 1883)?;
        let mqtt_topic = read_string_with_default("MQTT_TOPIC", "application/+/device/+/event/up");
        let mqtt_client_id = read_optional("MQTT_CLIENT_ID");
        let mqtt_keep_alive_seconds = read_u64_with_default("MQTT_KEEP_ALIVE_SECONDS", 60)?;
        let mqtt_reconnect_delay_seconds =
            read_u64_with_default("MQTT_RECONNECT_DELAY_SECONDS", 2)?;
        let pg_host = read_string_with_default("PG_HOST", "postgres");
        let pg_port = read_u16_with_default("PG_PORT", 5432)?;
        let pg_database = read_string_with_default("PG_DB", "iot");
        let pg_user = read_string_with_default("PG_USER", "iot_app");
        let pg_password = read_string_with_default("PG_PASSWORD", "iot_app");
        let db_ready_max_attempts = read_u32_with_default("DB_READY_MAX_ATTEMPTS", 60)?;
        let db_ready_delay_seconds = read_u64_with_default("DB_READY_DELAY_SECONDS", 2)?;
        let require_timescale = read_bool_with_default("REQUIRE_TIMESCALE", true);

        Ok(Self {
            mqtt_host,
            mqtt_port,
            mqtt_topic,
            mqtt_client_id,
            mqtt_keep_alive_seconds,
            mqtt_reconnect_delay_seconds,
            pg_host,
            pg_port,
            pg_database,
            pg_user,
            pg_password,
            db_ready_max_attempts,
            db_ready_delay_seconds,
            require_timescale,
        })
    }

    pub fn db_ready_delay(&self) -> Duration {
        Duration::from_secs(self.db_ready_delay_seconds)
    }

    pub fn mqtt_keep_alive(&self) -> Duration {
        Duration::from_secs(self.mqtt_keep_alive_seconds)
    }

    pub fn mqtt_reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.mqtt_reconnect_delay_seconds)
    }
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_string_with_default(key: &str, default: &str) -> String {
    read_optional(key).unwrap_or_else(|| default.to_string())
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let Some(value) = read_optional(key) else {
        return Ok(default);
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let Some(value) = read_optional(key) else {
        return Ok(default);
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let Some(value) = read_optional(key) else {
        return Ok(default);
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match read_optional(key) {
        Some(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        None => default,
    }
}
