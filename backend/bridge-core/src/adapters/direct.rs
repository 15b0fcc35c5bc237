use crate::adapters::{NativeFanout, StateManager, invoke_handler};
use crate::error::DispatchError;
use crate::store::{DirectStore, StateListener, Unsubscribe};
use crate::value::StateValue;

use common::Action;
use common::protocol::SET_STATE_ACTION;

use std::sync::Arc;

use log::{debug, warn};

/// Actions are handled by functions stored in the state itself.
///
/// `{ type: "increment" }` calls the `increment` property of the current
/// state with the payload. The built-in `setState` action merges an object
/// payload into the state.
pub struct DirectAdapter {
    store: Arc<dyn DirectStore>,
    fanout: NativeFanout,
}

impl DirectAdapter {
    pub fn new(store: Arc<dyn DirectStore>) -> Self {
        Self {
            store,
            fanout: NativeFanout::new(),
        }
    }
}

impl StateManager for DirectAdapter {
    fn get_state(&self) -> StateValue {
        self.store.get_state()
    }

    fn subscribe(&self, listener: StateListener) -> Unsubscribe {
        self.fanout
            .subscribe(listener, |native| self.store.subscribe(native))
    }

    fn process_action(&self, action: Action) {
        if action.action_type == SET_STATE_ACTION {
            match action.payload {
                Some(payload) if payload.is_object() => {
                    debug!("Merging setState payload into store");
                    let partial = StateValue::from(payload);
                    self.store.set_state(Box::new(move |_: &StateValue| partial));
                }
                _ => warn!("Ignoring setState action without an object payload"),
            }
            return;
        }

        let state = self.store.get_state();
        match state.get(&action.action_type).and_then(StateValue::as_callable) {
            Some(handler) => invoke_handler(&action.action_type, handler, action.payload),
            None => warn!("{}", DispatchError::handler_not_found(&action.action_type)),
        }
    }
}
