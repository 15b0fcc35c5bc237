use crate::adapters::{NativeFanout, StateManager};
use crate::store::{ReduxStore, StateListener, Unsubscribe};
use crate::value::StateValue;

use common::Action;

use std::sync::Arc;

use log::error;

/// Redux-style store: actions go straight to the store's own `dispatch`.
pub struct ReduxAdapter {
    store: Arc<dyn ReduxStore>,
    fanout: NativeFanout,
}

impl ReduxAdapter {
    pub fn new(store: Arc<dyn ReduxStore>) -> Self {
        Self {
            store,
            fanout: NativeFanout::new(),
        }
    }
}

impl StateManager for ReduxAdapter {
    fn get_state(&self) -> StateValue {
        self.store.get_state()
    }

    fn subscribe(&self, listener: StateListener) -> Unsubscribe {
        self.fanout
            .subscribe(listener, |native| self.store.subscribe(native))
    }

    fn process_action(&self, action: Action) {
        if let Err(e) = self.store.dispatch(&action) {
            error!("Reducer failed on '{}': {}", action.action_type, e);
        }
    }
}
