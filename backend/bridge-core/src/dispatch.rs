//! Turning dispatched values into `process_action` calls.

use crate::adapters::StateManager;
use crate::error::DispatchError;
use crate::value::StateValue;

use common::{Action, ErrorLocation};

use std::fmt::{Debug, Formatter, Result as FormatResult};
use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

/// Backend-only function that may read state and dispatch further actions.
pub type Thunk = Box<dyn FnOnce(&dyn Fn() -> StateValue, &Dispatcher) + Send>;

/// Anything that can be handed to `dispatch`.
pub enum Dispatchable {
    Thunk(Thunk),
    /// Bare action type; the payload comes from the second `dispatch` argument.
    Type(String),
    Action(Action),
    /// Untyped JSON as received over the channel.
    Raw(Value),
}

impl Dispatchable {
    pub fn thunk<F>(thunk: F) -> Self
    where
        F: FnOnce(&dyn Fn() -> StateValue, &Dispatcher) + Send + 'static,
    {
        Dispatchable::Thunk(Box::new(thunk))
    }

    /// Normalize a non-thunk into an action.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::ThunkMustRunInBackend`] for thunks
    /// - [`DispatchError::InvalidAction`] for an empty type or a raw value
    ///   that is neither a string nor an object with a `type`
    #[track_caller]
    pub fn into_action(self, payload: Option<Value>) -> Result<Action, DispatchError> {
        let location = ErrorLocation::caller();

        match self {
            Dispatchable::Thunk(_) => Err(DispatchError::ThunkMustRunInBackend { location }),
            Dispatchable::Type(action_type) => Ok(Action::new(action_type, payload)?),
            Dispatchable::Action(action) => Ok(action),
            Dispatchable::Raw(Value::String(action_type)) => Ok(Action::new(action_type, payload)?),
            Dispatchable::Raw(value @ Value::Object(_)) => Ok(Action::from_value(&value)?),
            Dispatchable::Raw(other) => Err(DispatchError::InvalidAction {
                message: format!("cannot dispatch {other}"),
                location,
            }),
        }
    }
}

impl Debug for Dispatchable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Dispatchable::Thunk(_) => f.write_str("Thunk"),
            Dispatchable::Type(action_type) => f.debug_tuple("Type").field(action_type).finish(),
            Dispatchable::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Dispatchable::Raw(value) => f.debug_tuple("Raw").field(value).finish(),
        }
    }
}

impl From<&str> for Dispatchable {
    fn from(action_type: &str) -> Self {
        Dispatchable::Type(action_type.to_string())
    }
}

impl From<String> for Dispatchable {
    fn from(action_type: String) -> Self {
        Dispatchable::Type(action_type)
    }
}

impl From<Action> for Dispatchable {
    fn from(action: Action) -> Self {
        Dispatchable::Action(action)
    }
}

impl From<Value> for Dispatchable {
    fn from(value: Value) -> Self {
        Dispatchable::Raw(value)
    }
}

/// Dispatch bound to one state manager.
///
/// Cloning is cheap and every clone targets the same manager, so several
/// independent bridges can live in one process.
#[derive(Clone)]
pub struct Dispatcher {
    manager: Arc<dyn StateManager>,
}

impl Dispatcher {
    pub fn new(manager: Arc<dyn StateManager>) -> Self {
        Self { manager }
    }

    /// Dispatch a thunk, an action type, an action, or raw JSON.
    ///
    /// Thunks run immediately on this call stack with a state getter and this
    /// dispatcher. Everything else becomes one `process_action` call. Values
    /// that are not actions are logged and dropped; this never fails.
    pub fn dispatch(&self, dispatchable: impl Into<Dispatchable>, payload: Option<Value>) {
        match dispatchable.into() {
            Dispatchable::Thunk(thunk) => {
                debug!("Running thunk");
                let manager = Arc::clone(&self.manager);
                let get_state = move || manager.get_state();
                thunk(&get_state, self);
            }
            other => match other.into_action(payload) {
                Ok(action) => {
                    debug!("Dispatching '{}'", action.action_type);
                    self.manager.process_action(action);
                }
                Err(e) => warn!("Dropping dispatch: {e}"),
            },
        }
    }

    pub fn get_state(&self) -> StateValue {
        self.manager.get_state()
    }

    pub fn state_manager(&self) -> &Arc<dyn StateManager> {
        &self.manager
    }
}
