use crate::error::BoxError;
use crate::store::{BackendStore, ListenerSet, Reducer, ReduxStore, StateListener, Unsubscribe};
use crate::sync::lock;
use crate::value::StateValue;

use common::Action;

use std::sync::{Arc, Mutex, RwLock};

use log::info;

/// Redux-style store: state changes only through its own reducer.
pub struct ReducerStore {
    state: Mutex<StateValue>,
    reducer: RwLock<Reducer>,
    listeners: Arc<ListenerSet<StateValue>>,
}

impl ReducerStore {
    pub fn new(initial: impl Into<StateValue>, reducer: Reducer) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(initial.into()),
            reducer: RwLock::new(reducer),
            listeners: ListenerSet::new(),
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn current_reducer(&self) -> Reducer {
        match self.reducer.read() {
            Ok(reducer) => Arc::clone(&*reducer),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }
}

impl ReduxStore for ReducerStore {
    /// Listeners are not notified when the reducer fails.
    fn dispatch(&self, action: &Action) -> Result<(), BoxError> {
        let reducer = self.current_reducer();

        {
            let mut state = lock(&self.state);
            let next = reducer(&state, action)?;
            *state = next.clone();
            self.listeners.enqueue(next);
        }

        self.listeners.flush();
        Ok(())
    }

    fn get_state(&self) -> StateValue {
        lock(&self.state).clone()
    }

    fn subscribe(&self, listener: StateListener) -> Unsubscribe {
        self.listeners.add(listener)
    }

    fn replace_reducer(&self, reducer: Reducer) {
        match self.reducer.write() {
            Ok(mut current) => *current = reducer,
            Err(poisoned) => *poisoned.into_inner() = reducer,
        }
        info!("Reducer replaced");
    }
}

impl BackendStore for ReducerStore {
    fn as_redux_store(self: Arc<Self>) -> Option<Arc<dyn ReduxStore>> {
        Some(self)
    }
}
