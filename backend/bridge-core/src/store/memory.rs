use crate::store::{
    BackendStore, DirectStore, ListenerSet, StateListener, StateUpdater, Unsubscribe, merge_state,
};
use crate::sync::lock;
use crate::value::StateValue;

use std::sync::{Arc, Mutex};

/// In-memory direct-style store.
///
/// State may contain [`StateValue::Function`] entries, which the direct
/// adapter treats as action handlers.
///
/// Listeners see changes in commit order, even when writers race.
pub struct MemoryStore {
    state: Mutex<StateValue>,
    listeners: Arc<ListenerSet<StateValue>>,
}

impl MemoryStore {
    pub fn new(initial: impl Into<StateValue>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(initial.into()),
            listeners: ListenerSet::new(),
        })
    }

    /// Replace the whole state without merging.
    pub fn replace_state(&self, state: StateValue) {
        {
            let mut current = lock(&self.state);
            *current = state.clone();
            self.listeners.enqueue(state);
        }

        self.listeners.flush();
    }

    /// Number of native listeners currently registered.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl DirectStore for MemoryStore {
    fn get_state(&self) -> StateValue {
        lock(&self.state).clone()
    }

    fn set_state(&self, updater: StateUpdater) {
        {
            let mut state = lock(&self.state);
            let next = merge_state(&state, updater(&state));
            if next == *state {
                return;
            }
            *state = next.clone();
            self.listeners.enqueue(next);
        }

        self.listeners.flush();
    }

    fn subscribe(&self, listener: StateListener) -> Unsubscribe {
        self.listeners.add(listener)
    }
}

impl BackendStore for MemoryStore {
    fn as_direct_store(self: Arc<Self>) -> Option<Arc<dyn DirectStore>> {
        Some(self)
    }
}
