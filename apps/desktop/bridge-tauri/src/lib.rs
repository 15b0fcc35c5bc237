//! Tauri v2 host glue for the state bridge.
//!
//! ```ignore
//! let bridge = bridge_tauri::start_bridge(store, &AdapterOptions::default(), config)?;
//! tauri::Builder::default()
//!     .plugin(bridge_tauri::init(bridge))
//!     .run(tauri::generate_context!())?;
//! ```

pub mod commands;
pub mod consumer;
pub mod error;
pub mod logger;
pub mod plugin;

#[cfg(test)]
mod tests;

pub use consumer::{TauriConsumerHost, WebviewConsumer};
pub use error::BridgeTauriError;
pub use plugin::{PluginOptions, init, init_with_options, start_bridge};
