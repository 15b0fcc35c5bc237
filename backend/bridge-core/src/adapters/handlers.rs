use crate::adapters::{NativeFanout, StateManager, invoke_handler};
use crate::error::DispatchError;
use crate::resolver::{HandlerMap, resolve_handler};
use crate::store::{DirectStore, StateListener, Unsubscribe};
use crate::value::StateValue;

use common::Action;

use std::sync::Arc;

use log::warn;

/// Direct store whose actions are handled by an external handler map.
///
/// Lookup goes through [`resolve_handler`], so `"counter.increment"` and
/// `"COUNTER:INCREMENT"` style names both work.
pub struct HandlerMapAdapter {
    store: Arc<dyn DirectStore>,
    handlers: HandlerMap,
    fanout: NativeFanout,
}

impl HandlerMapAdapter {
    pub fn new(store: Arc<dyn DirectStore>, handlers: HandlerMap) -> Self {
        Self {
            store,
            handlers,
            fanout: NativeFanout::new(),
        }
    }
}

impl StateManager for HandlerMapAdapter {
    fn get_state(&self) -> StateValue {
        self.store.get_state()
    }

    fn subscribe(&self, listener: StateListener) -> Unsubscribe {
        self.fanout
            .subscribe(listener, |native| self.store.subscribe(native))
    }

    fn process_action(&self, action: Action) {
        let Some(handler) = resolve_handler(&self.handlers, &action.action_type) else {
            warn!("{}", DispatchError::handler_not_found(&action.action_type));
            return;
        };

        invoke_handler(&action.action_type, &handler, action.payload);
    }
}
