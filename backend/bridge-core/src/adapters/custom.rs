use crate::adapters::StateManager;
use crate::store::{BackendStore, StateListener, Unsubscribe};
use crate::value::StateValue;

use common::Action;

use std::sync::Arc;

/// Pass-through for backend authors who implement [`StateManager`] themselves.
///
/// Wrapping the manager makes it registrable as a [`BackendStore`]; the
/// registry then hands the manager back unchanged.
pub struct CustomAdapter<M> {
    manager: Arc<M>,
}

impl<M: StateManager + 'static> CustomAdapter<M> {
    pub fn new(manager: M) -> Arc<Self> {
        Arc::new(Self {
            manager: Arc::new(manager),
        })
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }
}

impl<M: StateManager + 'static> StateManager for CustomAdapter<M> {
    fn get_state(&self) -> StateValue {
        self.manager.get_state()
    }

    fn subscribe(&self, listener: StateListener) -> Unsubscribe {
        self.manager.subscribe(listener)
    }

    fn process_action(&self, action: Action) {
        self.manager.process_action(action)
    }
}

impl<M: StateManager + 'static> BackendStore for CustomAdapter<M> {
    fn as_state_manager(self: Arc<Self>) -> Option<Arc<dyn StateManager>> {
        Some(self)
    }
}
