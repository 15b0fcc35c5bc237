use crate::bridge_tests::helpers::{INCREMENT, RecordingConsumer, as_consumers, counter_bridge, ids};

use bridge_core::config::BridgeConfig;

use serde_json::json;

/// **VALUE**: A transient send failure is retried once.
///
/// **BUG THIS CATCHES**: Would catch evicting a healthy window over a single
/// hiccup in the host transport.
#[tokio::test]
async fn given_one_failed_send_when_broadcasting_then_retry_delivers_and_consumer_stays() {
    // GIVEN: A subscribed consumer whose next send fails
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let flaky = RecordingConsumer::new("flaky");
    let _handle = bridge.subscribe(as_consumers(&[&flaky])).unwrap();
    bridge.consumer_ids().await;
    flaky.fail_next(1);

    // WHEN: Broadcasting
    bridge.dispatch(INCREMENT, None);

    // THEN: Delivered on retry and still tracked
    assert_eq!(bridge.consumer_ids().await, ids(&["flaky"]));
    assert_eq!(flaky.counters(), vec![0, 1]);
}

/// **VALUE**: A consumer that keeps failing is evicted without blocking the
/// others.
///
/// **WHY THIS MATTERS**: One broken window must not stall every other window.
#[tokio::test]
async fn given_consumer_that_always_fails_when_broadcasting_then_evicted_and_others_served() {
    // GIVEN: A healthy and a broken consumer
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let healthy = RecordingConsumer::new("healthy");
    let broken = RecordingConsumer::new("broken");
    let _handle = bridge.subscribe(as_consumers(&[&healthy, &broken])).unwrap();
    bridge.consumer_ids().await;
    broken.fail_next(usize::MAX);

    // WHEN: Broadcasting twice
    bridge.dispatch(INCREMENT, None);
    bridge.dispatch(INCREMENT, None);

    // THEN: Broken is gone, healthy saw everything
    assert_eq!(bridge.consumer_ids().await, ids(&["healthy"]));
    assert_eq!(healthy.counters(), vec![0, 1, 2]);
    assert_eq!(broken.counters(), vec![0]);
}

#[tokio::test]
async fn given_retry_disabled_when_send_fails_once_then_consumer_evicted() {
    let config = BridgeConfig {
        retry_failed_delivery: false,
        ..BridgeConfig::default()
    };
    let (bridge, _store) = counter_bridge(config);
    let flaky = RecordingConsumer::new("flaky");
    let _handle = bridge.subscribe(as_consumers(&[&flaky])).unwrap();
    bridge.consumer_ids().await;
    flaky.fail_next(1);

    bridge.dispatch(INCREMENT, None);

    assert!(bridge.consumer_ids().await.is_empty());
}

/// **VALUE**: Identical consecutive broadcasts are sent once.
///
/// **BUG THIS CATCHES**: Would catch the update id defeating de-duplication,
/// since it differs on every broadcast.
#[tokio::test]
async fn given_unchanged_state_when_store_notifies_twice_then_second_broadcast_skipped() {
    // GIVEN: A subscribed consumer
    let (bridge, store) = counter_bridge(BridgeConfig::default());
    let consumer = RecordingConsumer::new("main");
    let _handle = bridge.subscribe(as_consumers(&[&consumer])).unwrap();

    // WHEN: The same value is set twice
    store.replace_state(json!({ "counter": 5 }).into());
    store.replace_state(json!({ "counter": 5 }).into());
    bridge.dispatch(INCREMENT, None);
    bridge.consumer_ids().await;

    // THEN: The duplicate never went out
    assert_eq!(consumer.counters(), vec![0, 5, 6]);
}

#[tokio::test]
async fn given_dedupe_disabled_when_store_notifies_twice_then_both_broadcasts_sent() {
    let config = BridgeConfig {
        dedupe_broadcasts: false,
        ..BridgeConfig::default()
    };
    let (bridge, store) = counter_bridge(config);
    let consumer = RecordingConsumer::new("main");
    let _handle = bridge.subscribe(as_consumers(&[&consumer])).unwrap();

    store.replace_state(json!({ "counter": 5 }).into());
    store.replace_state(json!({ "counter": 5 }).into());
    bridge.consumer_ids().await;

    assert_eq!(consumer.counters(), vec![0, 5, 5]);
}
