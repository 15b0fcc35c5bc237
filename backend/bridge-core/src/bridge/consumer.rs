//! What the bridge needs to know about a display surface.

use crate::error::DeliveryError;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identity of a consumer (for Tauri, the window label).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsumerId(String);

impl ConsumerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ConsumerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConsumerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ConsumerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One display surface holding a replica.
pub trait Consumer: Send + Sync {
    fn id(&self) -> ConsumerId;

    /// `true` once the surface is gone for good.
    fn is_destroyed(&self) -> bool;

    /// Deliver `payload` on `channel` to this consumer's process.
    fn send(&self, channel: &str, payload: &Value) -> Result<(), DeliveryError>;
}

/// The host runtime's view of which consumers exist right now.
///
/// Consulted by the periodic reconciliation pass to pick up surfaces created
/// outside the bridge.
pub trait ConsumerHost: Send + Sync {
    fn live_consumers(&self) -> Vec<Arc<dyn Consumer>>;
}
