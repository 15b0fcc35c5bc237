use crate::adapters::{HandlerMapAdapter, StateManager};
use crate::bridge::Consumer;
use crate::dispatch::{Dispatchable, Dispatcher};
use crate::error::{DeliveryError, DispatchError};
use crate::replica::{ActionChannel, ConsumerClient, LocalConsumer, Replica};
use crate::resolver::HandlerMap;
use crate::store::MemoryStore;
use crate::value::StateValue;

use common::BridgeStatus;

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

#[test]
fn given_new_replica_when_reading_state_then_reports_status() {
    let replica = Replica::new();

    assert_eq!(replica.status(), BridgeStatus::Uninitialized);
    assert_eq!(replica.state(), json!({ "__bridge_status": "uninitialized" }));
}

/// **VALUE**: The update id is transport metadata and never reaches UI code.
///
/// **BUG THIS CATCHES**: Would catch the id leaking into rendered state, where
/// it would look like a real store key.
#[test]
fn given_snapshot_with_update_id_when_applied_then_id_recorded_and_stripped() {
    // GIVEN: An initializing replica
    let replica = Replica::new();
    replica.begin_initializing();
    assert_eq!(replica.state(), json!({ "__bridge_status": "initializing" }));

    // WHEN: A snapshot arrives
    replica.apply_snapshot(json!({ "counter": 1, "__bridge_update_id": 7 }));

    // THEN: Ready, stripped, id recorded
    assert_eq!(replica.status(), BridgeStatus::Ready);
    assert_eq!(replica.state(), json!({ "counter": 1 }));
    assert_eq!(replica.last_update_id(), Some(7));
}

#[test]
fn given_ready_replica_when_failed_then_error_status_keeps_last_state() {
    let replica = Replica::new();
    replica.apply_snapshot(json!({ "counter": 1 }));

    replica.fail("channel closed");

    assert_eq!(replica.status(), BridgeStatus::Error);
    assert_eq!(replica.error().as_deref(), Some("channel closed"));
    assert_eq!(replica.state(), json!({ "counter": 1 }));
}

#[test]
fn given_listener_when_snapshot_applied_then_listener_sees_stripped_state() {
    let replica = Replica::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    let _unsubscribe = replica.subscribe(Arc::new(move |state: &Value| {
        record.lock().unwrap().push(state.clone());
    }));

    replica.apply_snapshot(json!({ "n": 1, "__bridge_update_id": 1 }));

    assert_eq!(*seen.lock().unwrap(), vec![json!({ "n": 1 })]);
}

#[test]
fn given_closed_local_consumer_when_sending_then_destroyed_error() {
    let consumer = LocalConsumer::with_id("main", Replica::new());

    consumer.close();

    assert!(consumer.is_destroyed());
    assert!(matches!(
        consumer.send("event", &json!({})),
        Err(DeliveryError::Destroyed { .. })
    ));
}

/// **VALUE**: Thunks are rejected at the consumer edge.
///
/// **WHY THIS MATTERS**: A function cannot cross the process boundary. Failing
/// loudly here beats an action that silently never arrives.
#[test]
fn given_consumer_client_when_dispatching_thunk_then_thunk_must_run_in_backend() {
    // GIVEN: A client wired to a backend dispatcher
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let mut handlers = HandlerMap::new();
    handlers.insert(
        "PING".to_string(),
        StateValue::function(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        }),
    );
    let manager: Arc<dyn StateManager> =
        Arc::new(HandlerMapAdapter::new(MemoryStore::new(json!({})), handlers));
    let channel: Arc<dyn ActionChannel> = Arc::new(Dispatcher::new(manager));
    let client = ConsumerClient::new(channel);

    // WHEN: Dispatching a thunk, then a real action
    let rejected = client.dispatch(Dispatchable::thunk(|_, _| {}), None);
    let accepted = client.dispatch("PING", None);

    // THEN: Thunk rejected, action delivered
    assert!(matches!(rejected, Err(DispatchError::ThunkMustRunInBackend { .. })));
    assert!(accepted.is_ok());
    assert_eq!(*calls.lock().unwrap(), 1);
}
