use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StoreError {
    /// The registry could not classify a store by its capabilities.
    #[error("Unrecognized Store Type: {message} {location}")]
    UnrecognizedStoreType {
        message: String,
        location: ErrorLocation,
    },
}

impl StoreError {
    #[track_caller]
    pub fn unrecognized(message: impl Into<String>) -> Self {
        StoreError::UnrecognizedStoreType {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}
