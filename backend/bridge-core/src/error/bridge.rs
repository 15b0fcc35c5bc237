use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BridgeError {
    #[error("Bridge Destroyed: {message} {location}")]
    Destroyed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Runtime Error: {message} {location}")]
    Runtime {
        message: String,
        location: ErrorLocation,
    },
}

impl BridgeError {
    #[track_caller]
    pub fn destroyed(message: impl Into<String>) -> Self {
        BridgeError::Destroyed {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn runtime(message: impl Into<String>) -> Self {
        BridgeError::Runtime {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}
