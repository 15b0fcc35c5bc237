use crate::adapters::{CustomAdapter, StateManager};
use crate::error::StoreError;
use crate::registry::{
    AdapterOptions, StateManagerRegistry, clear_state_managers, get_state_manager, global,
    remove_state_manager,
};
use crate::store::{BackendStore, MemoryStore, ReducerStore, StateListener, Unsubscribe, reducer};
use crate::value::StateValue;

use common::Action;

use std::sync::Arc;

use serde_json::json;
use serial_test::serial;

struct Opaque;

impl BackendStore for Opaque {}

struct Silent;

impl StateManager for Silent {
    fn get_state(&self) -> StateValue {
        StateValue::Null
    }

    fn subscribe(&self, _listener: StateListener) -> Unsubscribe {
        Box::new(|| {})
    }

    fn process_action(&self, _action: Action) {}
}

/// **VALUE**: Same store, same manager.
///
/// **WHY THIS MATTERS**: Two managers for one store would each register a
/// native listener and every change would broadcast twice.
///
/// **BUG THIS CATCHES**: Would catch keying by something other than the
/// store allocation.
#[test]
fn given_same_store_when_get_or_create_twice_then_returns_same_instance() {
    // GIVEN: A registry and a store
    let registry = StateManagerRegistry::new();
    let store = MemoryStore::new(json!({}));

    // WHEN: Asking twice
    let first = registry.get_or_create(store.clone(), &AdapterOptions::default()).unwrap();
    let second = registry.get_or_create(store.clone(), &AdapterOptions::default()).unwrap();

    // THEN: Same instance
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);
}

#[test]
fn given_removed_store_when_get_or_create_then_returns_new_instance() {
    let registry = StateManagerRegistry::new();
    let store = MemoryStore::new(json!({}));
    let first = registry.get_or_create(store.clone(), &AdapterOptions::default()).unwrap();

    assert!(registry.remove(&store));
    let second = registry.get_or_create(store.clone(), &AdapterOptions::default()).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn given_unknown_store_when_removing_then_returns_false() {
    let registry = StateManagerRegistry::new();

    assert!(!registry.remove(&MemoryStore::new(json!({}))));
}

#[test]
fn given_two_stores_when_cleared_then_registry_is_empty() {
    let registry = StateManagerRegistry::new();
    let a = MemoryStore::new(json!({}));
    let b = MemoryStore::new(json!({}));
    registry.get_or_create(a.clone(), &AdapterOptions::default()).unwrap();
    registry.get_or_create(b.clone(), &AdapterOptions::default()).unwrap();

    registry.clear();

    assert!(registry.is_empty());
    assert!(!registry.contains(&a));
}

/// **VALUE**: Unclassifiable stores fail at setup instead of being guessed at.
#[test]
fn given_store_with_no_capabilities_when_get_or_create_then_unrecognized_store_type() {
    // GIVEN: A store advertising nothing
    let registry = StateManagerRegistry::new();

    // WHEN: Registering it
    let result = registry.get_or_create(Arc::new(Opaque), &AdapterOptions::default());

    // THEN: UnrecognizedStoreType, nothing registered
    assert!(matches!(result, Err(StoreError::UnrecognizedStoreType { .. })));
    assert!(registry.is_empty());
}

#[test]
fn given_custom_manager_when_get_or_create_then_manager_is_used_as_is() {
    let registry = StateManagerRegistry::new();
    let custom = CustomAdapter::new(Silent);

    let manager = registry.get_or_create(custom.clone(), &AdapterOptions::default()).unwrap();

    let expected: Arc<dyn StateManager> = custom;
    assert!(Arc::ptr_eq(&manager, &expected));
}

/// **VALUE**: Adapter choice follows the options for direct stores.
#[test]
fn given_direct_store_with_reducer_option_when_dispatching_then_reducer_applies() {
    // GIVEN: A direct store registered with a reducer
    let registry = StateManagerRegistry::new();
    let store = MemoryStore::new(json!({ "counter": 0 }));
    let options = AdapterOptions::with_reducer(reducer(|_: &StateValue, _: &Action| {
        Ok(StateValue::from(json!({ "counter": 10 })))
    }));

    // WHEN: Processing any action
    let manager = registry.get_or_create(store.clone(), &options).unwrap();
    manager.process_action(Action::new("ANY", None).unwrap());

    // THEN: The reducer result landed
    assert_eq!(manager.get_state().to_json(), json!({ "counter": 10 }));
}

#[test]
fn given_redux_store_when_get_or_create_then_actions_reach_its_reducer() {
    let registry = StateManagerRegistry::new();
    let store = ReducerStore::new(
        json!({ "n": 0 }),
        reducer(|_: &StateValue, _: &Action| Ok(StateValue::from(json!({ "n": 1 })))),
    );

    let manager = registry.get_or_create(store, &AdapterOptions::default()).unwrap();
    manager.process_action(Action::new("ANY", None).unwrap());

    assert_eq!(manager.get_state().to_json(), json!({ "n": 1 }));
}

#[test]
#[serial]
fn given_global_registry_when_store_removed_then_entry_is_gone() {
    clear_state_managers();
    let store = MemoryStore::new(json!({}));

    get_state_manager(store.clone(), &AdapterOptions::default()).unwrap();
    assert!(global().contains(&store));

    assert!(remove_state_manager(&store));
    assert!(!global().contains(&store));
}

#[test]
#[serial]
fn given_global_registry_when_cleared_then_empty() {
    let store = MemoryStore::new(json!({}));
    get_state_manager(store, &AdapterOptions::default()).unwrap();

    clear_state_managers();

    assert!(global().is_empty());
}
