use common::ErrorLocation;

use std::error::Error as StdError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DeliveryError {
    #[error("Delivery Error: could not send to consumer '{consumer}': {message} {location}")]
    Send {
        consumer: String,
        message: String,
        location: ErrorLocation,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("Delivery Error: consumer '{consumer}' is destroyed {location}")]
    Destroyed {
        consumer: String,
        location: ErrorLocation,
    },
}

impl DeliveryError {
    #[track_caller]
    pub fn send(consumer: impl Into<String>, message: impl Into<String>) -> Self {
        DeliveryError::Send {
            consumer: consumer.into(),
            message: message.into(),
            location: ErrorLocation::caller(),
            source: None,
        }
    }

    #[track_caller]
    pub fn destroyed(consumer: impl Into<String>) -> Self {
        DeliveryError::Destroyed {
            consumer: consumer.into(),
            location: ErrorLocation::caller(),
        }
    }
}
