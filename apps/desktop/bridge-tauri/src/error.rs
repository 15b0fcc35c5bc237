use bridge_core::CoreError;

use common::ErrorLocation;

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors returned from bridge commands and plugin setup.
///
/// Serialized for the webview as `{ "type": <variant>, "data": {...} }`, with
/// the source location kept for logs.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BridgeTauriError {
    /// Host-side failure (paths, logger, runtime)
    #[error("Bridge Tauri Error: {message} {location}")]
    Host {
        message: String,
        location: ErrorLocation,
    },

    /// Error from bridge-core
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// The dispatched value is not an action
    #[error("Invalid Action Error: {message} {location}")]
    InvalidAction {
        message: String,
        location: ErrorLocation,
    },

    /// The plugin was not given a bridge
    #[error("Not Initialized Error: {message} {location}")]
    NotInitialized {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for BridgeTauriError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        BridgeTauriError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
