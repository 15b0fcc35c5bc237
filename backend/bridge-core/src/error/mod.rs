pub mod bridge;
pub mod config;
pub mod delivery;
pub mod dispatch;
pub mod store;

pub use bridge::BridgeError;
pub use config::ConfigError;
pub use delivery::DeliveryError;
pub use dispatch::DispatchError;
pub use store::StoreError;

use std::error::Error as StdError;

use thiserror::Error;

/// Failure returned by user-supplied handlers and reducers.
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
