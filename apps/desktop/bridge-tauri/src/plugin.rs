//! The Tauri plugin.
//!
//! Registers `get_state`, `dispatch`, `subscribe` and `unsubscribe` under the
//! `statebridge` plugin namespace and feeds window lifecycle events into the
//! bridge:
//! - webview ready: event-driven discovery
//! - window destroyed: immediate removal
//! - app exit: bridge teardown
//!
//! The window list is attached as the sweep's discovery source during setup.

use crate::commands;
use crate::consumer::{TauriConsumerHost, WebviewConsumer};
use crate::error::BridgeTauriError;
use crate::logger;

use bridge_core::bridge::ConsumerId;
use bridge_core::config::BridgeConfig;
use bridge_core::registry::AdapterOptions;
use bridge_core::store::BackendStore;
use bridge_core::{BackendBridge, create_bridge};

use common::ErrorLocation;
use common::protocol::PLUGIN_NAME;

use std::panic::Location;
use std::sync::Arc;

use log::{info, warn};
use tauri::plugin::{Builder as PluginBuilder, TauriPlugin};
use tauri::{Manager, RunEvent, Runtime, WindowEvent};

/// Plugin setup options.
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    /// Install the fern logger in the app log directory during setup.
    pub init_logger: bool,
}

/// Build a bridge for `store` on Tauri's async runtime.
///
/// Call this before `tauri::Builder::run`; the bridge needs a runtime to
/// spawn its actor on, which the main thread does not have.
///
/// # Errors
///
/// Returns [`BridgeTauriError::Core`] if the store is not recognized.
#[track_caller]
pub fn start_bridge(
    store: Arc<dyn BackendStore>,
    options: &AdapterOptions,
    config: BridgeConfig,
) -> Result<Arc<BackendBridge>, BridgeTauriError> {
    let runtime = tauri::async_runtime::handle();
    let _guard = runtime.inner().enter();

    Ok(Arc::new(create_bridge(store, options, config)?))
}

/// The plugin with default options.
pub fn init<R: Runtime>(bridge: Arc<BackendBridge>) -> TauriPlugin<R> {
    init_with_options(bridge, PluginOptions::default())
}

pub fn init_with_options<R: Runtime>(
    bridge: Arc<BackendBridge>,
    options: PluginOptions,
) -> TauriPlugin<R> {
    let setup_bridge = Arc::clone(&bridge);
    let event_bridge = Arc::clone(&bridge);

    PluginBuilder::new(PLUGIN_NAME)
        .invoke_handler(tauri::generate_handler![
            commands::get_state,
            commands::dispatch,
            commands::subscribe,
            commands::unsubscribe,
        ])
        .setup(move |app, _api| {
            if options.init_logger {
                if let Err(e) = logger::initialize_for_app(app) {
                    warn!("Bridge logger not installed: {e}");
                }
            }

            app.manage(Arc::clone(&setup_bridge));
            setup_bridge.attach_host(TauriConsumerHost::new(app.clone()));

            info!("State bridge plugin ready");
            Ok(())
        })
        .on_webview_ready(|webview| {
            let app = webview.app_handle();
            match app.try_state::<Arc<BackendBridge>>() {
                Some(bridge) => {
                    bridge.handle_consumer_created(WebviewConsumer::new(app.clone(), webview.label()))
                }
                None => warn!(
                    "{}",
                    BridgeTauriError::NotInitialized {
                        message: format!("no bridge for webview '{}'", webview.label()),
                        location: ErrorLocation::from(Location::caller()),
                    }
                ),
            }
        })
        .on_event(move |_app, event| match event {
            RunEvent::WindowEvent {
                label,
                event: WindowEvent::Destroyed,
                ..
            } => event_bridge.handle_consumer_closed(ConsumerId::new(label.as_str())),
            RunEvent::Exit => event_bridge.destroy(),
            _ => {}
        })
        .build()
}
