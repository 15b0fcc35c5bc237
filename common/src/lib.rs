//! Wire protocol shared by the backend and every consumer.
//!
//! Nothing in here knows about stores or windows. These are the shapes that
//! cross the process boundary plus the names both sides agree on.
//!
//! ## Architecture
//!
//! - **common** (this crate): protocol types and error plumbing
//! - **bridge-core**: state managers, dispatch and broadcast
//! - **bridge-tauri**: host-runtime glue for Tauri webviews

pub mod error;
pub mod protocol;

pub use error::error_location::ErrorLocation;
pub use error::protocol_error::ProtocolError;
pub use protocol::{Action, BridgeStatus};

#[cfg(test)]
mod tests;
