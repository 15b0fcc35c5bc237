use crate::adapters::{NativeFanout, StateManager};
use crate::error::BoxError;
use crate::store::{DirectStore, Reducer, StateListener, Unsubscribe};
use crate::sync::lock;
use crate::value::StateValue;

use common::Action;

use std::sync::{Arc, Mutex};

use log::error;

/// Direct store driven by a pure reducer.
pub struct ReducerAdapter {
    store: Arc<dyn DirectStore>,
    reducer: Reducer,
    fanout: NativeFanout,
}

impl ReducerAdapter {
    pub fn new(store: Arc<dyn DirectStore>, reducer: Reducer) -> Self {
        Self {
            store,
            reducer,
            fanout: NativeFanout::new(),
        }
    }
}

impl StateManager for ReducerAdapter {
    fn get_state(&self) -> StateValue {
        self.store.get_state()
    }

    fn subscribe(&self, listener: StateListener) -> Unsubscribe {
        self.fanout
            .subscribe(listener, |native| self.store.subscribe(native))
    }

    /// Reduces inside the store's own update, so concurrent actions never
    /// see a stale state. A failing reducer leaves the state untouched and
    /// notifies nobody.
    fn process_action(&self, action: Action) {
        let reducer = Arc::clone(&self.reducer);
        let failure: Arc<Mutex<Option<BoxError>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&failure);
        let action_type = action.action_type.clone();

        self.store.set_state(Box::new(move |prev: &StateValue| {
            match reducer(prev, &action) {
                Ok(next) => next,
                Err(e) => {
                    *lock(&slot) = Some(e);
                    prev.clone()
                }
            }
        }));

        if let Some(e) = lock(&failure).take() {
            error!("Reducer failed on '{action_type}': {e}");
        }
    }
}
