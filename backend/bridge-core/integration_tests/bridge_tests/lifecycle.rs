use crate::bridge_tests::helpers::{INCREMENT, RecordingConsumer, as_consumers, counter_bridge, ids};

use bridge_core::config::BridgeConfig;
use bridge_core::error::BridgeError;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

/// **VALUE**: `unsubscribe` removes exactly the consumers of its handle.
#[tokio::test]
async fn given_two_handles_when_one_unsubscribes_then_only_its_consumers_leave() {
    // GIVEN: Two separate subscriptions
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let a = RecordingConsumer::new("a");
    let b = RecordingConsumer::new("b");
    let handle_a = bridge.subscribe(as_consumers(&[&a])).unwrap();
    let _handle_b = bridge.subscribe(as_consumers(&[&b])).unwrap();

    // WHEN: The first handle unsubscribes, twice
    handle_a.unsubscribe();
    handle_a.unsubscribe();
    bridge.dispatch(INCREMENT, None);

    // THEN: Only b remains and receives the change
    assert_eq!(bridge.consumer_ids().await, ids(&["b"]));
    assert_eq!(handle_a.consumer_ids(), ids(&["a"]).as_slice());
    assert_eq!(a.counters(), vec![0]);
    assert_eq!(b.counters(), vec![0, 1]);
}

#[tokio::test]
async fn given_consumer_subscribed_twice_when_subscribing_then_single_entry_and_snapshot() {
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let a = RecordingConsumer::new("a");

    let _first = bridge.subscribe(as_consumers(&[&a])).unwrap();
    let _second = bridge.subscribe(as_consumers(&[&a])).unwrap();

    assert_eq!(bridge.consumer_ids().await, ids(&["a"]));
    assert_eq!(a.counters(), vec![0]);
}

/// **VALUE**: `destroy` is idempotent and makes the bridge unusable at once.
///
/// **BUG THIS CATCHES**: Would catch:
/// - a second destroy panicking or double-unsubscribing
/// - subscribe still accepted after destroy
/// - state changes still delivered after destroy
#[tokio::test]
async fn given_destroyed_bridge_when_used_then_refuses_work_and_delivers_nothing() {
    // GIVEN: A bridge with one consumer
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let a = RecordingConsumer::new("a");
    let _handle = bridge.subscribe(as_consumers(&[&a])).unwrap();
    bridge.consumer_ids().await;

    // WHEN: Destroying twice, then using it
    bridge.destroy();
    bridge.destroy();
    let subscribe = bridge.subscribe(as_consumers(&[&RecordingConsumer::new("late")]));
    bridge.dispatch(INCREMENT, None);
    tokio::time::sleep(Duration::from_millis(20)).await;

    // THEN: Refused, empty, silent
    assert!(bridge.is_destroyed());
    assert!(matches!(subscribe, Err(BridgeError::Destroyed { .. })));
    assert!(bridge.consumer_ids().await.is_empty());
    assert_eq!(a.counters(), vec![0]);
}

/// **VALUE**: `destroy` can be called from inside a delivery.
///
/// **WHY THIS MATTERS**: UI code commonly tears the bridge down in response
/// to a state change it just received.
///
/// **BUG THIS CATCHES**: Would catch a destroy that waits on the actor and so
/// deadlocks when the actor itself is the caller.
#[tokio::test]
async fn given_consumer_that_destroys_bridge_when_delivered_then_no_deadlock() {
    // GIVEN: A consumer that destroys the bridge on its second message
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let bridge = Arc::new(bridge);
    let consumer = RecordingConsumer::new("main");
    let weak = Arc::downgrade(&bridge);
    let seen = Arc::new(Mutex::new(0));
    let count = Arc::clone(&seen);
    consumer.on_send(move || {
        let mut count = count.lock().unwrap();
        *count += 1;
        if *count == 2 {
            if let Some(bridge) = weak.upgrade() {
                bridge.destroy();
            }
        }
    });
    let _handle = bridge.subscribe(as_consumers(&[&consumer])).unwrap();

    // WHEN: Two changes happen
    bridge.dispatch(INCREMENT, None);
    bridge.dispatch(INCREMENT, None);
    tokio::time::sleep(Duration::from_millis(20)).await;

    // THEN: The bridge stopped after the second message
    assert!(bridge.is_destroyed());
    assert_eq!(consumer.counters(), vec![0, 1]);
}

#[tokio::test]
async fn given_state_listener_when_store_changes_then_receives_sanitized_state() {
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    let unsubscribe = bridge.subscribe_state(Arc::new(move |state: &Value| {
        record.lock().unwrap().push(state.clone());
    }));

    bridge.dispatch(INCREMENT, None);
    unsubscribe();
    bridge.dispatch(INCREMENT, None);

    assert_eq!(*seen.lock().unwrap(), vec![json!({ "counter": 1 })]);
    assert_eq!(bridge.get_state(), json!({ "counter": 2 }));
}
