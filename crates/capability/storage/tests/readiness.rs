use iot_storage::{InMemoryMeasurementStore, StorageError, wait_until_ready};
use std::time::Duration;

#[tokio::test]
async fn ready_on_first_attempt() {
    let store = InMemoryMeasurementStore::new();
    wait_until_ready(&store, 3, Duration::from_millis(1))
        .await
        .expect("ready");
    assert_eq!(store.ping_count(), 1);
}

#[tokio::test]
async fn ready_after_transient_failures() {
    let store = InMemoryMeasurementStore::new().unavailable_for(2);
    wait_until_ready(&store, 5, Duration::from_millis(1))
        .await
        .expect("ready");
    assert_eq!(store.ping_count(), 3);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let store = InMemoryMeasurementStore::new().offline();
    let err = wait_until_ready(&store, 4, Duration::from_millis(1))
        .await
        .expect_err("not ready");
    assert!(matches!(err, StorageError::NotReady { attempts: 4 }));
    assert_eq!(store.ping_count(), 4);
}

#[tokio::test]
async fn zero_attempts_never_probes() {
    let store = InMemoryMeasurementStore::new();
    let err = wait_until_ready(&store, 0, Duration::from_millis(1))
        .await
        .expect_err("not ready");
    assert!(matches!(err, StorageError::NotReady { attempts: 0 }));
    assert_eq!(store.ping_count(), 0);
}

#[tokio::test]
async fn sleeps_between_attempts() {
    let store = InMemoryMeasurementStore::new().unavailable_for(2);
    let started = std::time::Instant::now();
    wait_until_ready(&store, 3, Duration::from_millis(20))
        .await
        .expect("ready");
    assert!(started.elapsed() >= Duration::from_millis(40));
}
