use crate::store::{ListenerSet, StateListener, Unsubscribe};
use crate::sync::lock;
use crate::value::StateValue;

use std::sync::{Arc, Mutex};

/// One native store subscription shared by all of an adapter's listeners.
///
/// The native listener is registered on the first `subscribe` and removed
/// when the adapter is dropped.
pub(crate) struct NativeFanout {
    listeners: Arc<ListenerSet<StateValue>>,
    native: Mutex<Option<Unsubscribe>>,
}

impl NativeFanout {
    pub(crate) fn new() -> Self {
        Self {
            listeners: ListenerSet::new(),
            native: Mutex::new(None),
        }
    }

    pub(crate) fn subscribe<C>(&self, listener: StateListener, connect: C) -> Unsubscribe
    where
        C: FnOnce(StateListener) -> Unsubscribe,
    {
        {
            let mut native = lock(&self.native);
            if native.is_none() {
                let listeners = Arc::clone(&self.listeners);
                *native = Some(connect(Arc::new(move |state: &StateValue| {
                    listeners.notify(state)
                })));
            }
        }

        self.listeners.add(listener)
    }
}

impl Drop for NativeFanout {
    fn drop(&mut self) {
        if let Some(unsubscribe) = lock(&self.native).take() {
            unsubscribe();
        }
    }
}
