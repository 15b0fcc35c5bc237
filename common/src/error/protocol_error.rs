use crate::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ProtocolError {
    #[error("Invalid Action: {message} {location}")]
    InvalidAction {
        message: String,
        location: ErrorLocation,
    },
}
