use iot_telemetry::{
    init_tracing, metrics, new_event_id, record_decode_failure, record_raw_event,
    record_write_failure, record_write_success,
};

#[test]
fn event_ids_are_unique() {
    let first = new_event_id();
    let second = new_event_id();
    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[test]
fn counters_only_grow() {
    init_tracing();
    // 允许重复初始化。
    init_tracing();

    let before = metrics().snapshot();
    record_raw_event();
    record_decode_failure();
    record_write_success();
    record_write_failure();
    let after = metrics().snapshot();

    assert!(after.raw_events > before.raw_events);
    assert!(after.decode_failures > before.decode_failures);
    assert!(after.write_success > before.write_success);
    assert!(after.write_failure > before.write_failure);
}
