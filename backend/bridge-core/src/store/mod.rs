//! Backend store shapes and the structural inspection the registry relies on.
//!
//! Two store styles are understood natively:
//!
//! - [`DirectStore`]: `get_state` + `set_state` + `subscribe` ([`MemoryStore`])
//! - [`ReduxStore`]: `dispatch` + `get_state` + `subscribe` + `replace_reducer`
//!   ([`ReducerStore`])
//!
//! Anything that already is a [`StateManager`] is used untouched. A type
//! advertises what it is through [`BackendStore`].

mod listeners;
mod memory;
mod reducer;

pub use listeners::{Listener, ListenerSet, Unsubscribe};
pub use memory::MemoryStore;
pub use reducer::ReducerStore;

use crate::adapters::StateManager;
use crate::error::BoxError;
use crate::value::StateValue;

use common::Action;

use std::sync::Arc;

/// Listener over backend state.
pub type StateListener = Listener<StateValue>;

/// Computes the next state from the previous one. Must not call back into the
/// store it is applied to.
pub type StateUpdater = Box<dyn FnOnce(&StateValue) -> StateValue + Send>;

/// Pure `(state, action) -> state` function.
pub type Reducer = Arc<dyn Fn(&StateValue, &Action) -> Result<StateValue, BoxError> + Send + Sync>;

pub fn reducer<F>(reduce: F) -> Reducer
where
    F: Fn(&StateValue, &Action) -> Result<StateValue, BoxError> + Send + Sync + 'static,
{
    Arc::new(reduce)
}

pub trait DirectStore: Send + Sync {
    fn get_state(&self) -> StateValue;

    /// Apply `updater` atomically. An object result is shallow-merged into an
    /// object state; anything else replaces it. A write that leaves the state
    /// unchanged notifies nobody.
    fn set_state(&self, updater: StateUpdater);

    fn subscribe(&self, listener: StateListener) -> Unsubscribe;
}

pub trait ReduxStore: Send + Sync {
    fn dispatch(&self, action: &Action) -> Result<(), BoxError>;

    fn get_state(&self) -> StateValue;

    fn subscribe(&self, listener: StateListener) -> Unsubscribe;

    fn replace_reducer(&self, reducer: Reducer);
}

/// Capability inspection used to pick an adapter.
///
/// Every method defaults to `None`; implement the ones that describe the
/// type. A store answering `None` to all three is rejected by the registry.
pub trait BackendStore: Send + Sync + 'static {
    fn as_state_manager(self: Arc<Self>) -> Option<Arc<dyn StateManager>> {
        None
    }

    fn as_redux_store(self: Arc<Self>) -> Option<Arc<dyn ReduxStore>> {
        None
    }

    fn as_direct_store(self: Arc<Self>) -> Option<Arc<dyn DirectStore>> {
        None
    }
}

/// Shallow merge with the semantics of [`DirectStore::set_state`].
pub(crate) fn merge_state(previous: &StateValue, next: StateValue) -> StateValue {
    match (previous, next) {
        (StateValue::Object(previous), StateValue::Object(partial)) => {
            let mut merged = previous.clone();
            merged.extend(partial);
            StateValue::Object(merged)
        }
        (_, next) => next,
    }
}
