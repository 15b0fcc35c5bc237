use crate::dispatch::{Dispatchable, Dispatcher};
use crate::error::DispatchError;

use common::Action;

use std::sync::Arc;

use log::debug;
use serde_json::Value;

/// Transport carrying concrete actions from a consumer to the backend.
pub trait ActionChannel: Send + Sync {
    fn send_action(&self, action: Action) -> Result<(), DispatchError>;
}

/// In-process channel straight into the backend dispatcher.
impl ActionChannel for Dispatcher {
    fn send_action(&self, action: Action) -> Result<(), DispatchError> {
        self.dispatch(action, None);
        Ok(())
    }
}

/// Consumer-side dispatch.
///
/// Thunks cannot cross the process boundary and are rejected here; anything
/// else is normalized to an [`Action`] and handed to the channel.
#[derive(Clone)]
pub struct ConsumerClient {
    channel: Arc<dyn ActionChannel>,
}

impl ConsumerClient {
    pub fn new(channel: Arc<dyn ActionChannel>) -> Self {
        Self { channel }
    }

    /// # Errors
    ///
    /// - [`DispatchError::ThunkMustRunInBackend`] for thunks
    /// - [`DispatchError::InvalidAction`] for values that are not actions
    /// - whatever the channel reports
    #[track_caller]
    pub fn dispatch(
        &self,
        dispatchable: impl Into<Dispatchable>,
        payload: Option<Value>,
    ) -> Result<(), DispatchError> {
        let action = dispatchable.into().into_action(payload)?;
        debug!("Sending '{}' to backend", action.action_type);
        self.channel.send_action(action)
    }
}
