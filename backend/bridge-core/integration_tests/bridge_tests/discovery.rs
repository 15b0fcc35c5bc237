use crate::bridge_tests::helpers::{
    INCREMENT, RecordingConsumer, TestHost, as_consumers, counter_bridge, ids,
};

use bridge_core::bridge::{Consumer, ConsumerId};
use bridge_core::config::BridgeConfig;

use std::sync::Arc;
use std::time::Duration;

/// **VALUE**: A dead consumer is dropped by one sweep, and a second sweep
/// changes nothing.
///
/// **WHY THIS MATTERS**: Windows can vanish without a close event. Without the
/// sweep the bridge would keep sending into the void forever.
///
/// **BUG THIS CATCHES**: Would catch:
/// - sweeps that ignore the liveness predicate
/// - a second sweep that errors or removes a live consumer
#[tokio::test]
async fn given_destroyed_consumer_when_sweeping_then_evicted_and_second_sweep_is_noop() {
    // GIVEN: Two tracked consumers, one of which dies
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let alive = RecordingConsumer::new("alive");
    let dead = RecordingConsumer::new("dead");
    let _handle = bridge.subscribe(as_consumers(&[&alive, &dead])).unwrap();
    assert_eq!(bridge.consumer_ids().await, ids(&["alive", "dead"]));
    dead.kill();

    // WHEN: Sweeping once, then again
    bridge.sweep();
    let after_first = bridge.consumer_ids().await;
    bridge.sweep();
    let after_second = bridge.consumer_ids().await;

    // THEN: Dead is gone after the first, nothing changes after the second
    assert_eq!(after_first, ids(&["alive"]));
    assert_eq!(after_second, after_first);

    bridge.dispatch(INCREMENT, None);
    bridge.consumer_ids().await;
    assert_eq!(alive.counters(), vec![0, 1]);
    assert_eq!(dead.counters(), vec![0]);
}

#[tokio::test]
async fn given_short_sweep_interval_when_consumer_dies_then_timer_evicts_it() {
    let config = BridgeConfig {
        sweep_interval_ms: 50,
        ..BridgeConfig::default()
    };
    let (bridge, _store) = counter_bridge(config);
    let dead = RecordingConsumer::new("dead");
    let _handle = bridge.subscribe(as_consumers(&[&dead])).unwrap();
    bridge.consumer_ids().await;

    dead.kill();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(bridge.consumer_ids().await.is_empty());
}

/// **VALUE**: Consumers the host knows about but the bridge does not are
/// picked up on attach and on later sweeps.
///
/// **BUG THIS CATCHES**: Would catch a child window opened by application
/// code never receiving state.
#[tokio::test]
async fn given_host_with_untracked_consumers_when_sweeping_then_they_are_subscribed() {
    // GIVEN: A host that already shows one window
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let host = TestHost::new();
    let first = RecordingConsumer::new("first");
    host.open(first.clone());

    // WHEN: Attaching the host
    bridge.attach_host(host.clone());

    // THEN: The existing window is tracked and has the snapshot
    assert_eq!(bridge.consumer_ids().await, ids(&["first"]));
    assert_eq!(first.counters(), vec![0]);

    // WHEN: Another window appears and a sweep runs after a change
    bridge.dispatch(INCREMENT, None);
    let second = RecordingConsumer::new("second");
    host.open(second.clone());
    bridge.sweep();

    // THEN: The newcomer is tracked with the current state only
    assert_eq!(bridge.consumer_ids().await, ids(&["first", "second"]));
    assert_eq!(second.counters(), vec![1]);
    assert_eq!(first.counters(), vec![0, 1]);
}

/// **VALUE**: Host events are the primary discovery path.
#[tokio::test]
async fn given_created_and_closed_events_when_handled_then_tracked_set_follows() {
    // GIVEN: A bridge with no consumers
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let window = RecordingConsumer::new("window");

    // WHEN: The host reports the window created
    bridge.handle_consumer_created(window.clone() as Arc<dyn Consumer>);

    // THEN: Tracked and initialized
    assert_eq!(bridge.consumer_ids().await, ids(&["window"]));
    assert_eq!(window.counters(), vec![0]);

    // WHEN: Created is reported twice, then closed twice
    bridge.handle_consumer_created(window.clone() as Arc<dyn Consumer>);
    bridge.handle_consumer_closed(ConsumerId::new("window"));
    bridge.handle_consumer_closed(ConsumerId::new("window"));

    // THEN: No duplicate snapshot, and removal is idempotent
    assert!(bridge.consumer_ids().await.is_empty());
    assert_eq!(window.counters(), vec![0]);
}

#[tokio::test]
async fn given_already_destroyed_consumer_when_created_event_arrives_then_not_tracked() {
    let (bridge, _store) = counter_bridge(BridgeConfig::default());
    let ghost = RecordingConsumer::new("ghost");
    ghost.kill();

    bridge.handle_consumer_created(ghost.clone() as Arc<dyn Consumer>);

    assert!(bridge.consumer_ids().await.is_empty());
    assert!(ghost.payloads().is_empty());
}
