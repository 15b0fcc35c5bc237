use common::{ErrorLocation, ProtocolError};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DispatchError {
    #[error("Handler Not Found: no handler for action '{action_type}' {location}")]
    HandlerNotFound {
        action_type: String,
        location: ErrorLocation,
    },

    #[error("Thunk Must Run In Backend: thunks cannot cross the process boundary, dispatch the actions they produce instead {location}")]
    ThunkMustRunInBackend { location: ErrorLocation },

    #[error("Invalid Action: {message} {location}")]
    InvalidAction {
        message: String,
        location: ErrorLocation,
    },

    #[error("Channel Error: {message} {location}")]
    Channel {
        message: String,
        location: ErrorLocation,
    },
}

impl DispatchError {
    #[track_caller]
    pub fn handler_not_found(action_type: impl Into<String>) -> Self {
        DispatchError::HandlerNotFound {
            action_type: action_type.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn thunk_must_run_in_backend() -> Self {
        DispatchError::ThunkMustRunInBackend {
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn channel(message: impl Into<String>) -> Self {
        DispatchError::Channel {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<ProtocolError> for DispatchError {
    #[track_caller]
    fn from(error: ProtocolError) -> Self {
        DispatchError::InvalidAction {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
