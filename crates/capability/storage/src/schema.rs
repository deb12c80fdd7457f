//! 测量表结构
//!
//! 所有 DDL 都使用 if-not-exists 语义，多实例并发启动时依赖数据库自身的幂等原语。

/// 测量表名
pub const MEASUREMENT_TABLE: &str = "temperature_measurements";

/// 建表。
///
/// TimescaleDB 要求唯一约束包含分区列，因此主键为 `(id, received_at)`。
pub const CREATE_TABLE: &str = "create table if not exists temperature_measurements ( \
    id bigserial not null, \
    device_eui text not null, \
    temperature_c double precision, \
    received_at timestamptz not null default now(), \
    raw jsonb not null, \
    primary key (id, received_at) \
)";

/// 转换为按 received_at 分区的 hypertable（已是 hypertable 时为空操作）。
pub const CREATE_HYPERTABLE: &str = "select create_hypertable( \
    'temperature_measurements', 'received_at', if_not_exists => true \
)";

/// 设备 + 时间倒序索引，服务“每个设备最近读数”查询。
pub const CREATE_DEVICE_TIME_INDEX: &str =
    "create index if not exists idx_temperature_measurements_device_time \
     on temperature_measurements (device_eui, received_at desc)";

/// 检查 timescaledb 扩展是否已安装。
pub const TIMESCALE_INSTALLED: &str =
    "select exists(select 1 from pg_extension where extname = 'timescaledb')";

pub const INSERT_MEASUREMENT: &str = "insert into temperature_measurements \
    (device_eui, temperature_c, received_at, raw) values ($1, $2, $3, $4)";

/// 是否执行 hypertable 转换。
///
/// 要求 timescale 时总是执行（扩展缺失则建表失败）；否则只在扩展已安装时执行。
/// `timescale_installed` 为 None 表示未检查。
pub fn should_create_hypertable(require_timescale: bool, timescale_installed: Option<bool>) -> bool {
    require_timescale || timescale_installed.unwrap_or(false)
}

/// 按执行顺序排列的 DDL。
pub fn provisioning_statements() -> [&'static str; 3] {
    [CREATE_TABLE, CREATE_HYPERTABLE, CREATE_DEVICE_TIME_INDEX]
}
