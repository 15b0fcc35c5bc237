//! Keeps one authoritative backend store in sync with any number of display
//! surfaces living in other processes.
//!
//! ## Flow
//!
//! 1. A backend store is classified by the [`registry`] and wrapped in a
//!    [`StateManager`](adapters::StateManager).
//! 2. Consumers dispatch actions; the [`dispatch`] layer turns them into
//!    `process_action` calls.
//! 3. Every state change is [`serializer`]-sanitized and broadcast by the
//!    [`bridge`] to every tracked consumer.
//! 4. Each consumer keeps a [`replica`] of the last snapshot.

pub mod adapters;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod replica;
pub mod resolver;
pub mod serializer;
pub mod store;
pub mod value;

mod sync;
#[cfg(test)]
mod tests;

pub use adapters::StateManager;
pub use bridge::{BackendBridge, Consumer, ConsumerHost, ConsumerId, CoreBridge, create_bridge};
pub use config::BridgeConfig;
pub use dispatch::{Dispatchable, Dispatcher};
pub use error::CoreError;
pub use registry::{AdapterOptions, StateManagerRegistry};
pub use value::{Callable, StateValue};
