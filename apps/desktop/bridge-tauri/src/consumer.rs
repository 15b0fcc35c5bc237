//! Tauri webview windows as bridge consumers.

use bridge_core::bridge::{Consumer, ConsumerHost, ConsumerId};
use bridge_core::error::DeliveryError;

use std::sync::Arc;

use log::trace;
use serde_json::Value;
use tauri::{AppHandle, Emitter, EventTarget, Manager, Runtime};

/// One webview window, identified by its label.
///
/// Destroyed once the app no longer knows a window with that label.
pub struct WebviewConsumer<R: Runtime> {
    app: AppHandle<R>,
    label: String,
}

impl<R: Runtime> WebviewConsumer<R> {
    pub fn new(app: AppHandle<R>, label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            app,
            label: label.into(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<R: Runtime> Consumer for WebviewConsumer<R> {
    fn id(&self) -> ConsumerId {
        ConsumerId::new(self.label.clone())
    }

    fn is_destroyed(&self) -> bool {
        self.app.get_webview_window(&self.label).is_none()
    }

    fn send(&self, channel: &str, payload: &Value) -> Result<(), DeliveryError> {
        if self.is_destroyed() {
            return Err(DeliveryError::destroyed(self.label.clone()));
        }

        trace!("Emitting '{channel}' to '{}'", self.label);
        self.app
            .emit_to(EventTarget::webview_window(self.label.clone()), channel, payload)
            .map_err(|e| DeliveryError::send(self.label.clone(), e.to_string()))
    }
}

/// The app's open webview windows, for discovery sweeps.
pub struct TauriConsumerHost<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> TauriConsumerHost<R> {
    pub fn new(app: AppHandle<R>) -> Arc<Self> {
        Arc::new(Self { app })
    }
}

impl<R: Runtime> ConsumerHost for TauriConsumerHost<R> {
    fn live_consumers(&self) -> Vec<Arc<dyn Consumer>> {
        self.app
            .webview_windows()
            .into_keys()
            .map(|label| WebviewConsumer::new(self.app.clone(), label) as Arc<dyn Consumer>)
            .collect()
    }
}
