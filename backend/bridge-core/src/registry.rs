//! One [`StateManager`] per backend store.
//!
//! Entries are keyed by the address of the store's `Arc` allocation. An entry
//! holds its adapter, and the adapter holds the store, so an address cannot
//! be reused while its entry exists. Entries never expire on their own; call
//! [`StateManagerRegistry::remove`] or [`StateManagerRegistry::clear`].
//!
//! Bridges should receive a registry explicitly. [`global`] exists for hosts
//! that keep a single process-wide bridge.

use crate::adapters::{DirectAdapter, HandlerMapAdapter, ReducerAdapter, ReduxAdapter, StateManager};
use crate::error::StoreError;
use crate::resolver::HandlerMap;
use crate::store::{BackendStore, Reducer};
use crate::sync::lock;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, info};
use once_cell::sync::Lazy;

static GLOBAL_REGISTRY: Lazy<StateManagerRegistry> = Lazy::new(StateManagerRegistry::new);

/// Strategy selection for direct-style stores. Ignored for other kinds.
#[derive(Clone, Default)]
pub struct AdapterOptions {
    pub handlers: Option<HandlerMap>,
    pub reducer: Option<Reducer>,
}

impl AdapterOptions {
    pub fn with_handlers(handlers: HandlerMap) -> Self {
        Self {
            handlers: Some(handlers),
            reducer: None,
        }
    }

    pub fn with_reducer(reducer: Reducer) -> Self {
        Self {
            handlers: None,
            reducer: Some(reducer),
        }
    }
}

/// Identity of a store allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreKey(usize);

impl StoreKey {
    pub fn of<S: ?Sized>(store: &Arc<S>) -> Self {
        StoreKey(Arc::as_ptr(store).cast::<()>() as usize)
    }
}

#[derive(Default)]
pub struct StateManagerRegistry {
    entries: Mutex<HashMap<StoreKey, Arc<dyn StateManager>>>,
}

impl StateManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the manager for `store`, creating it on first use.
    ///
    /// Repeated calls with the same store return the same instance until it
    /// is removed. `options` only matter on the call that creates the entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnrecognizedStoreType`] if the store advertises
    /// none of the supported capabilities.
    #[track_caller]
    pub fn get_or_create(
        &self,
        store: Arc<dyn BackendStore>,
        options: &AdapterOptions,
    ) -> Result<Arc<dyn StateManager>, StoreError> {
        let key = StoreKey::of(&store);
        let mut entries = lock(&self.entries);

        if let Some(existing) = entries.get(&key) {
            debug!("Reusing state manager for store {key:?}");
            return Ok(Arc::clone(existing));
        }

        let manager = create_manager(store, options)?;
        entries.insert(key, Arc::clone(&manager));
        info!("Registered state manager for store {key:?}");

        Ok(manager)
    }

    /// Evict one store. Returns whether an entry existed.
    pub fn remove<S: ?Sized>(&self, store: &Arc<S>) -> bool {
        let removed = lock(&self.entries).remove(&StoreKey::of(store)).is_some();
        if removed {
            info!("Removed state manager for store {:?}", StoreKey::of(store));
        }
        removed
    }

    pub fn clear(&self) {
        let mut entries = lock(&self.entries);
        info!("Clearing {} state manager(s)", entries.len());
        entries.clear();
    }

    pub fn contains<S: ?Sized>(&self, store: &Arc<S>) -> bool {
        lock(&self.entries).contains_key(&StoreKey::of(store))
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[track_caller]
fn create_manager(
    store: Arc<dyn BackendStore>,
    options: &AdapterOptions,
) -> Result<Arc<dyn StateManager>, StoreError> {
    if let Some(manager) = Arc::clone(&store).as_state_manager() {
        debug!("Store is already a state manager");
        return Ok(manager);
    }

    if let Some(redux) = Arc::clone(&store).as_redux_store() {
        debug!("Detected redux-style store");
        return Ok(Arc::new(ReduxAdapter::new(redux)));
    }

    if let Some(direct) = store.as_direct_store() {
        if let Some(handlers) = &options.handlers {
            debug!("Detected direct store with {} handler(s)", handlers.len());
            return Ok(Arc::new(HandlerMapAdapter::new(direct, handlers.clone())));
        }

        if let Some(reducer) = &options.reducer {
            debug!("Detected direct store with reducer");
            return Ok(Arc::new(ReducerAdapter::new(direct, Arc::clone(reducer))));
        }

        debug!("Detected direct store");
        return Ok(Arc::new(DirectAdapter::new(direct)));
    }

    Err(StoreError::unrecognized(
        "store is neither a state manager, a redux-style store nor a direct store",
    ))
}

/// Process-wide registry.
pub fn global() -> &'static StateManagerRegistry {
    &GLOBAL_REGISTRY
}

#[track_caller]
pub fn get_state_manager(
    store: Arc<dyn BackendStore>,
    options: &AdapterOptions,
) -> Result<Arc<dyn StateManager>, StoreError> {
    global().get_or_create(store, options)
}

pub fn remove_state_manager<S: ?Sized>(store: &Arc<S>) -> bool {
    global().remove(store)
}

pub fn clear_state_managers() {
    global().clear()
}
