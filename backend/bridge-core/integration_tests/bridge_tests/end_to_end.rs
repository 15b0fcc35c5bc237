use crate::bridge_tests::helpers::{INCREMENT, RecordingConsumer, as_consumers, counter_bridge, ids};

use bridge_core::bridge::BackendBridge;
use bridge_core::config::BridgeConfig;
use bridge_core::error::CoreError;
use bridge_core::registry::{AdapterOptions, clear_state_managers};
use bridge_core::replica::{LocalConsumer, Replica};
use bridge_core::store::{BackendStore, MemoryStore};
use bridge_core::value::StateValue;
use bridge_core::{Consumer, create_bridge};

use common::BridgeStatus;

use std::sync::Arc;

use serde_json::json;
use serial_test::serial;

/// **VALUE**: Every consumer sees every state in order.
///
/// **WHY THIS MATTERS**: This is the whole point of the bridge. A window that
/// skips or reorders a value renders state the backend never had.
///
/// **BUG THIS CATCHES**: Would catch:
/// - broadcasts coalesced under load
/// - deliveries reordered between consumers
/// - the initial snapshot missing for consumers registered up front
#[tokio::test]
async fn given_three_consumers_when_incrementing_three_times_then_each_sees_0_1_2_3() {
    // GIVEN: A reducer-driven counter and three consumers registered first
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let a = RecordingConsumer::new("a");
    let b = RecordingConsumer::new("b");
    let c = RecordingConsumer::new("c");
    let _handle = bridge
        .subscribe(as_consumers(&[&a, &b, &c]))
        .expect("Failed to subscribe");

    // WHEN: Dispatching the increment three times
    for _ in 0..3 {
        bridge.dispatch(INCREMENT, None);
    }
    assert_eq!(bridge.consumer_ids().await, ids(&["a", "b", "c"]));

    // THEN: Each consumer observed 0, 1, 2, 3 with increasing update ids
    for consumer in [&a, &b, &c] {
        assert_eq!(consumer.counters(), vec![0, 1, 2, 3]);
        assert_eq!(consumer.update_ids(), vec![0, 1, 2, 3]);
        assert!(
            consumer
                .channels()
                .iter()
                .all(|channel| channel == "statebridge://state-update")
        );
    }
}

/// **VALUE**: A late joiner gets the current state at once.
///
/// **BUG THIS CATCHES**: Would catch a new consumer left blank until the next
/// change, or handed a stale snapshot.
#[tokio::test]
async fn given_prior_broadcasts_when_late_consumer_subscribes_then_receives_current_snapshot() {
    // GIVEN: A counter already at 3
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    for _ in 0..3 {
        bridge.dispatch(INCREMENT, None);
    }

    // WHEN: A consumer subscribes afterwards
    let late = RecordingConsumer::new("late");
    let _handle = bridge.subscribe(as_consumers(&[&late])).unwrap();
    bridge.consumer_ids().await;

    // THEN: Its only message is the current state
    assert_eq!(late.counters(), vec![3]);
}

#[tokio::test]
async fn given_local_consumer_when_state_changes_then_replica_becomes_ready_without_metadata() {
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let replica = Replica::new();
    let consumer: Arc<dyn Consumer> = LocalConsumer::with_id("local", replica.clone());
    assert_eq!(replica.status(), BridgeStatus::Initializing);

    let _handle = bridge.subscribe(vec![consumer]).unwrap();
    bridge.dispatch(INCREMENT, None);
    bridge.consumer_ids().await;

    assert_eq!(replica.status(), BridgeStatus::Ready);
    assert_eq!(replica.state(), json!({ "counter": 1 }));
    assert_eq!(replica.last_update_id(), Some(1));
}

/// **VALUE**: Handlers embedded in state never reach a consumer.
#[tokio::test]
async fn given_state_with_handler_when_fetching_and_broadcasting_then_handler_is_absent() {
    // GIVEN: A direct store whose state embeds a handler
    let store = MemoryStore::new(StateValue::object([
        ("counter", StateValue::from(json!(0))),
        ("noop", StateValue::function(|_| Ok(()))),
    ]));
    let registry = bridge_core::StateManagerRegistry::new();
    let bridge = BackendBridge::new(
        &registry,
        store.clone(),
        &AdapterOptions::default(),
        BridgeConfig::default(),
    )
    .unwrap();
    let consumer = RecordingConsumer::new("main");

    // WHEN: Fetching and subscribing
    let fetched = bridge.get_state();
    let _handle = bridge.subscribe(as_consumers(&[&consumer])).unwrap();
    bridge.consumer_ids().await;

    // THEN: Neither carries the handler
    assert_eq!(fetched, json!({ "counter": 0 }));
    assert_eq!(
        consumer.payloads(),
        vec![json!({ "counter": 0, "__bridge_update_id": 0 })]
    );
}

#[tokio::test]
#[serial]
async fn given_unrecognized_store_when_creating_bridge_then_store_error() {
    struct Opaque;
    impl BackendStore for Opaque {}

    let result = create_bridge(Arc::new(Opaque), &AdapterOptions::default(), BridgeConfig::default());

    assert!(matches!(result, Err(CoreError::Store(_))));
}

/// **VALUE**: Building a second bridge around the same store reuses the
/// manager.
///
/// **BUG THIS CATCHES**: Would catch each bridge creating its own adapter,
/// which doubles native listeners and broadcasts.
#[tokio::test]
#[serial]
async fn given_same_store_when_creating_two_bridges_then_they_share_one_manager() {
    // GIVEN: A clean global registry and one store
    clear_state_managers();
    let store = MemoryStore::new(json!({ "counter": 0 }));

    // WHEN: Creating two bridges
    let first = create_bridge(store.clone(), &AdapterOptions::default(), BridgeConfig::default())
        .unwrap();
    let second = create_bridge(store.clone(), &AdapterOptions::default(), BridgeConfig::default())
        .unwrap();

    // THEN: Same manager, one native listener
    assert!(Arc::ptr_eq(first.state_manager(), second.state_manager()));
    assert_eq!(store.listener_count(), 1);

    clear_state_managers();
}
