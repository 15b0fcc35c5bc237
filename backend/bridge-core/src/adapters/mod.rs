//! Uniform [`StateManager`] over every supported store style.
//!
//! | store | options | adapter |
//! |---|---|---|
//! | already a manager | - | used as-is (wrap bare managers in [`CustomAdapter`]) |
//! | [`ReduxStore`](crate::store::ReduxStore) | - | [`ReduxAdapter`] |
//! | [`DirectStore`](crate::store::DirectStore) | `handlers` | [`HandlerMapAdapter`] |
//! | [`DirectStore`](crate::store::DirectStore) | `reducer` | [`ReducerAdapter`] |
//! | [`DirectStore`](crate::store::DirectStore) | neither | [`DirectAdapter`] |
//!
//! `process_action` never fails outward. Handler and reducer errors, and
//! handler panics, are logged at this boundary so one bad action cannot stall
//! delivery to the other consumers.

mod custom;
mod direct;
mod fanout;
mod handlers;
mod reducer;
mod redux;

pub use custom::CustomAdapter;
pub use direct::DirectAdapter;
pub use handlers::HandlerMapAdapter;
pub use reducer::ReducerAdapter;
pub use redux::ReduxAdapter;

pub(crate) use fanout::NativeFanout;

use crate::store::{StateListener, Unsubscribe};
use crate::value::{Callable, StateValue};

use common::Action;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use log::error;
use serde_json::Value;

pub trait StateManager: Send + Sync {
    fn get_state(&self) -> StateValue;

    fn subscribe(&self, listener: StateListener) -> Unsubscribe;

    fn process_action(&self, action: Action);
}

/// Run an action handler, logging an error or a panic instead of passing it on.
pub(crate) fn invoke_handler(action_type: &str, handler: &Callable, payload: Option<Value>) {
    match catch_unwind(AssertUnwindSafe(|| handler.call(payload))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Handler for '{action_type}' failed: {e}"),
        Err(panic) => error!(
            "Handler for '{action_type}' panicked: {}",
            panic_message(panic.as_ref())
        ),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
