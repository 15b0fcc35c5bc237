use crate::store::{DirectStore, MemoryStore, ReducerStore, ReduxStore, reducer};
use crate::value::StateValue;

use common::Action;

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::json;

#[test]
fn given_object_state_when_set_state_returns_partial_then_it_is_merged() {
    let store = MemoryStore::new(json!({ "a": 1, "b": 2 }));

    store.set_state(Box::new(|_: &StateValue| StateValue::from(json!({ "b": 3 }))));

    assert_eq!(store.get_state().to_json(), json!({ "a": 1, "b": 3 }));
}

#[test]
fn given_scalar_result_when_set_state_then_state_is_replaced() {
    let store = MemoryStore::new(json!({ "a": 1 }));

    store.set_state(Box::new(|_: &StateValue| StateValue::from(json!(7))));

    assert_eq!(store.get_state().to_json(), json!(7));
}

/// **VALUE**: A listener may unsubscribe itself while being notified.
///
/// **BUG THIS CATCHES**: Would catch notification holding the listener lock,
/// which deadlocks the first time a listener unsubscribes from inside itself.
#[test]
fn given_listener_that_unsubscribes_itself_when_notified_then_no_deadlock() {
    // GIVEN: A listener holding its own unsubscribe
    let store = MemoryStore::new(json!({ "n": 0 }));
    let slot: Arc<Mutex<Option<crate::store::Unsubscribe>>> = Arc::new(Mutex::new(None));
    let calls = Arc::new(Mutex::new(0));

    let inner_slot = Arc::clone(&slot);
    let inner_calls = Arc::clone(&calls);
    let unsubscribe = store.subscribe(Arc::new(move |_: &StateValue| {
        *inner_calls.lock().unwrap() += 1;
        if let Some(unsubscribe) = inner_slot.lock().unwrap().take() {
            unsubscribe();
        }
    }));
    *slot.lock().unwrap() = Some(unsubscribe);

    // WHEN: Two changes happen
    store.replace_state(StateValue::from(json!({ "n": 1 })));
    store.replace_state(StateValue::from(json!({ "n": 2 })));

    // THEN: The listener ran once and is gone
    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn given_reducer_store_when_reducer_replaced_then_new_reducer_applies() {
    let store = ReducerStore::new(
        json!({ "n": 0 }),
        reducer(|_: &StateValue, _: &Action| Ok(StateValue::from(json!({ "n": 1 })))),
    );

    store.replace_reducer(reducer(|_: &StateValue, _: &Action| {
        Ok(StateValue::from(json!({ "n": 100 })))
    }));
    store.dispatch(&Action::new("ANY", None).unwrap()).unwrap();

    assert_eq!(store.get_state().to_json(), json!({ "n": 100 }));
}

/// **VALUE**: Listeners see racing writes in commit order.
///
/// **WHY THIS MATTERS**: The bridge broadcasts in notification order. If a
/// later commit is announced first, every window ends on a state the store no
/// longer holds.
///
/// **BUG THIS CATCHES**: Would catch notification running outside the commit
/// order, so a writer stalled in a listener is overtaken by the next writer.
#[test]
fn given_writer_stalled_in_listener_when_second_write_commits_then_notifications_keep_commit_order() {
    // GIVEN: A listener that stalls on the first change until released
    let store = MemoryStore::new(json!({ "counter": 0 }));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let entered_tx = Mutex::new(entered_tx);
    let release_rx = Mutex::new(release_rx);

    let record = Arc::clone(&seen);
    let _unsubscribe = store.subscribe(Arc::new(move |state: &StateValue| {
        let counter = state.get("counter").and_then(StateValue::as_i64).unwrap();
        record.lock().unwrap().push(counter);
        if counter == 1 {
            entered_tx.lock().unwrap().send(()).unwrap();
            release_rx.lock().unwrap().recv().unwrap();
        }
    }));

    // WHEN: One thread commits 1 and stalls, then 2 is committed meanwhile
    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.replace_state(StateValue::from(json!({ "counter": 1 }))))
    };
    entered_rx.recv().unwrap();
    store.replace_state(StateValue::from(json!({ "counter": 2 })));
    release_tx.send(()).unwrap();
    writer.join().unwrap();

    // THEN: 1 was announced before 2, and the last value is the store's state
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    assert_eq!(store.get_state().to_json(), json!({ "counter": 2 }));
}

#[test]
fn given_listener_that_writes_when_notified_then_nested_change_follows_in_order() {
    let store = MemoryStore::new(json!({ "counter": 0 }));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let record = Arc::clone(&seen);
    let writer = Arc::downgrade(&store);
    let _unsubscribe = store.subscribe(Arc::new(move |state: &StateValue| {
        let counter = state.get("counter").and_then(StateValue::as_i64).unwrap();
        record.lock().unwrap().push(counter);
        if counter == 1 {
            if let Some(store) = writer.upgrade() {
                store.replace_state(StateValue::from(json!({ "counter": 2 })));
            }
        }
    }));

    store.replace_state(StateValue::from(json!({ "counter": 1 })));

    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[test]
fn given_update_that_changes_nothing_when_set_state_then_no_listener_fires() {
    let store = MemoryStore::new(json!({ "a": 1 }));
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let _unsubscribe = store.subscribe(Arc::new(move |_: &StateValue| {
        *counter.lock().unwrap() += 1;
    }));

    store.set_state(Box::new(|state: &StateValue| state.clone()));
    store.set_state(Box::new(|_: &StateValue| StateValue::from(json!({ "a": 1 }))));

    assert_eq!(*calls.lock().unwrap(), 0);
}
