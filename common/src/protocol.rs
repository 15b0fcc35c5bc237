//! Shapes and names that cross the process boundary.

use crate::{ErrorLocation, ProtocolError};

use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Plugin name the host runtime registers the bridge commands under.
pub const PLUGIN_NAME: &str = "statebridge";

/// Default event that carries sanitized snapshots to consumers.
pub const STATE_UPDATE_EVENT: &str = "statebridge://state-update";

/// Metadata key added to object snapshots. Monotonic per bridge.
pub const UPDATE_ID_KEY: &str = "__bridge_update_id";

/// Key under which a replica reports its status before the first snapshot.
pub const STATUS_KEY: &str = "__bridge_status";

/// Built-in action that shallow-merges its payload into a direct store.
pub const SET_STATE_ACTION: &str = "setState";

/// A mutation request.
///
/// `action_type` is never empty once constructed through [`Action::new`] or
/// [`Action::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Action {
    #[track_caller]
    pub fn new(action_type: impl Into<String>, payload: Option<Value>) -> Result<Self, ProtocolError> {
        let action_type = action_type.into();
        if action_type.is_empty() {
            return Err(ProtocolError::InvalidAction {
                message: String::from("action type must not be empty"),
                location: ErrorLocation::caller(),
            });
        }

        Ok(Self {
            action_type,
            payload,
        })
    }

    /// Interpret an arbitrary JSON value as an action object.
    ///
    /// Accepts `{ "type": "<non-empty>", "payload"?: any }`. Extra keys are
    /// ignored.
    #[track_caller]
    pub fn from_value(value: &Value) -> Result<Self, ProtocolError> {
        let location = ErrorLocation::caller();

        let object = value.as_object().ok_or_else(|| ProtocolError::InvalidAction {
            message: format!("expected an object, got {}", json_kind(value)),
            location,
        })?;

        let action_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::InvalidAction {
                message: String::from("missing string field `type`"),
                location,
            })?;

        Self::new(action_type, object.get("payload").cloned())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Connection status a consumer-side replica exposes to UI code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Error,
}

impl BridgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeStatus::Uninitialized => "uninitialized",
            BridgeStatus::Initializing => "initializing",
            BridgeStatus::Ready => "ready",
            BridgeStatus::Error => "error",
        }
    }
}

impl Display for BridgeStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}
