//! IoT 遥测接入桥：订阅设备上行消息，标准化后写入 TimescaleDB。

mod ingest;

use iot_config::IngestorConfig;
use iot_storage::{MeasurementStore, PgMeasurementStore, PgSettings};
use iot_telemetry::init_tracing;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 初始化结构化日志
    init_tracing();
    // 从环境变量加载运行配置
    let config = IngestorConfig::from_env()?;

    let settings = PgSettings {
        host: config.pg_host.clone(),
        port: config.pg_port,
        database: config.pg_database.clone(),
        user: config.pg_user.clone(),
        password: config.pg_password.clone(),
    };
    info!(
        target: "iot.ingest",
        pg_host = %settings.host,
        pg_port = settings.port,
        pg_database = %settings.database,
        "starting ingestor"
    );
    let store: Arc<dyn MeasurementStore> = Arc::new(
        PgMeasurementStore::connect_lazy(&settings)
            .with_require_timescale(config.require_timescale),
    );
    let source = ingest::mqtt_source(&config);

    if let Err(err) = ingest::run_ingestor(&config, store, source).await {
        error!(target: "iot.ingest", error = %err, "ingestor_stopped");
        return Err(err.into());
    }
    Ok(())
}
