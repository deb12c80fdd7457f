//! 上行报文 -> MeasurementRecord 的标准化。
//!
//! 不同网络服务器厂商的报文结构并不一致，提取顺序为：
//! 嵌套最深的字段优先，其次是扁平字段，最后退化为默认值。
//! 这里的函数都是纯函数，从不返回错误。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use domain::{DecodedPayload, MeasurementRecord, UNKNOWN_DEVICE};
use serde_json::Value;

/// `object` 下温度字段的别名，按优先级排列。
pub const TEMPERATURE_KEYS: [&str; 4] = ["temperature", "temp", "temperature_c", "temperatureC"];

/// 将解码后的报文规范化为测量记录（raw 原样保留）。
pub fn normalize(payload: DecodedPayload) -> MeasurementRecord {
    MeasurementRecord {
        device_id: extract_device_id(&payload),
        temperature_c: extract_temperature(&payload),
        received_at: extract_timestamp(&payload),
        raw: payload,
    }
}

/// 提取设备 EUI：`deviceInfo.devEui` -> 顶层 `devEui` -> `"unknown"`。
pub fn extract_device_id(payload: &DecodedPayload) -> String {
    let nested = payload
        .get("deviceInfo")
        .and_then(Value::as_object)
        .and_then(|info| non_empty_str(info.get("devEui")));

    nested
        .or_else(|| non_empty_str(payload.get("devEui")))
        .unwrap_or(UNKNOWN_DEVICE)
        .to_string()
}

/// 提取温度：只看 `object` 下第一个为数值的别名字段。
pub fn extract_temperature(payload: &DecodedPayload) -> Option<f64> {
    let object = payload.get("object")?.as_object()?;
    TEMPERATURE_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_f64))
        .filter(|value| value.is_finite())
}

/// 提取顶层 `time`，缺失或无法解析时取当前 UTC 时间。
pub fn extract_timestamp(payload: &DecodedPayload) -> DateTime<Utc> {
    payload
        .get("time")
        .and_then(Value::as_str)
        .and_then(parse_iso8601)
        .unwrap_or_else(Utc::now)
}

/// 解析 ISO-8601 时间戳；结尾的 `Z` 视为 UTC，无时区的值按 UTC 处理。
///
/// 首尾空白会被忽略。
pub fn parse_iso8601(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    let normalized = match input.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => input.to_string(),
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%d %H:%M%:z",
    ] {
        if let Ok(ts) = DateTime::parse_from_str(&normalized, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(value: Value) -> DecodedPayload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn assert_close_to_now(ts: DateTime<Utc>) {
        let delta = (Utc::now() - ts).num_seconds().abs();
        assert!(delta <= 5, "timestamp {ts} is {delta}s away from now");
    }

    #[test]
    fn device_id_prefers_device_info() {
        let p = payload(json!({ "deviceInfo": { "devEui": "AA:BB" }, "devEui": "CC:DD" }));
        assert_eq!(extract_device_id(&p), "AA:BB");
    }

    #[test]
    fn device_id_falls_back_to_top_level() {
        let p = payload(json!({ "deviceInfo": { "devEui": "" }, "devEui": "CC:DD" }));
        assert_eq!(extract_device_id(&p), "CC:DD");

        let p = payload(json!({ "deviceInfo": "not-an-object", "devEui": "CC:DD" }));
        assert_eq!(extract_device_id(&p), "CC:DD");
    }

    #[test]
    fn device_id_uses_sentinel() {
        assert_eq!(extract_device_id(&payload(json!({}))), UNKNOWN_DEVICE);
        let p = payload(json!({ "deviceInfo": { "devEui": 42 }, "devEui": "" }));
        assert_eq!(extract_device_id(&p), UNKNOWN_DEVICE);
    }

    #[test]
    fn temperature_follows_alias_priority() {
        let p = payload(json!({
            "object": { "temperatureC": 1.0, "temperature_c": 2.0, "temp": 3.0, "temperature": 4.0 }
        }));
        assert_eq!(extract_temperature(&p), Some(4.0));

        let p = payload(json!({ "object": { "temperatureC": 1.0, "temp": 3 } }));
        assert_eq!(extract_temperature(&p), Some(3.0));
    }

    #[test]
    fn temperature_skips_non_numeric_aliases() {
        let p = payload(json!({ "object": { "temperature": "21.5", "temp": true, "temperature_c": 18.25 } }));
        assert_eq!(extract_temperature(&p), Some(18.25));
    }

    #[test]
    fn temperature_absent_without_object() {
        assert_eq!(extract_temperature(&payload(json!({}))), None);
        assert_eq!(extract_temperature(&payload(json!({ "object": [21.5] }))), None);
        assert_eq!(extract_temperature(&payload(json!({ "object": { "humidity": 40 } }))), None);
        assert_eq!(extract_temperature(&payload(json!({ "temperature": 21.5 }))), None);
    }

    #[test]
    fn timestamp_parses_utc_designator() {
        let p = payload(json!({ "time": "2024-01-01T00:00:00Z" }));
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        assert_eq!(Some(extract_timestamp(&p)), expected);
    }

    #[test]
    fn timestamp_converts_offsets_to_utc() {
        let p = payload(json!({ "time": "2024-06-01T14:00:00.250+02:00" }));
        let ts = extract_timestamp(&p);
        assert_eq!(ts.to_rfc3339(), "2024-06-01T12:00:00.250+00:00");
    }

    #[test]
    fn timestamp_accepts_naive_and_date_only() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).single();
        assert_eq!(parse_iso8601("2024-03-05T07:08:09"), expected);
        assert_eq!(parse_iso8601("2024-03-05 07:08:09"), expected);
        assert_eq!(
            parse_iso8601("2024-03-05"),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).single()
        );
    }

    #[test]
    fn timestamp_accepts_minute_precision_with_offset() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single();
        assert_eq!(parse_iso8601("2024-06-01T12:00"), expected);
        assert_eq!(parse_iso8601("2024-06-01 12:00"), expected);
        assert_eq!(parse_iso8601("2024-06-01T12:00Z"), expected);
        assert_eq!(parse_iso8601("2024-06-01T14:00+02:00"), expected);
        assert_eq!(parse_iso8601("2024-06-01 14:00+02:00"), expected);
    }

    #[test]
    fn timestamp_ignores_surrounding_whitespace() {
        assert_eq!(
            parse_iso8601("  2024-06-01T12:00:00Z\n"),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single()
        );
    }

    #[test]
    fn timestamp_falls_back_to_now() {
        assert_close_to_now(extract_timestamp(&payload(json!({ "time": "not-a-date" }))));
        assert_close_to_now(extract_timestamp(&payload(json!({}))));
        assert_close_to_now(extract_timestamp(&payload(json!({ "time": 1717243200 }))));
    }

    #[test]
    fn normalize_full_uplink() {
        let p = payload(json!({
            "deviceInfo": { "devEui": "AA:BB" },
            "object": { "temperature": 21.5 },
            "time": "2024-06-01T12:00:00Z"
        }));
        let record = normalize(p.clone());
        assert_eq!(record.device_id, "AA:BB");
        assert_eq!(record.temperature_c, Some(21.5));
        assert_eq!(
            Some(record.received_at),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single()
        );
        assert_eq!(record.raw, p);
    }

    #[test]
    fn normalize_partial_uplink() {
        let record = normalize(payload(json!({ "object": { "temp": 19 }, "time": "bad" })));
        assert_eq!(record.device_id, UNKNOWN_DEVICE);
        assert_eq!(record.temperature_c, Some(19.0));
        assert_close_to_now(record.received_at);
    }

    #[test]
    fn normalize_empty_payload() {
        let record = normalize(DecodedPayload::new());
        assert_eq!(record.device_id, UNKNOWN_DEVICE);
        assert_eq!(record.temperature_c, None);
        assert_close_to_now(record.received_at);
        assert!(record.raw.is_empty());
    }
}
