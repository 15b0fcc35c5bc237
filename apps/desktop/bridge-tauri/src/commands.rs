use crate::consumer::WebviewConsumer;
use crate::error::BridgeTauriError;

use bridge_core::BackendBridge;
use bridge_core::bridge::{Consumer, ConsumerId};
use bridge_core::dispatch::Dispatchable;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;
use tauri::{AppHandle, Runtime, State, Webview, command as TauriCommand};

/// Current sanitized state.
#[TauriCommand]
pub async fn get_state(bridge: State<'_, Arc<BackendBridge>>) -> Result<Value, BridgeTauriError> {
    debug!("Getting state");
    Ok(bridge.get_state())
}

/// Dispatch an action from a webview.
///
/// `action` is either an action type string (with `payload`) or an action
/// object `{ type, payload? }`.
///
/// # Errors
///
/// Returns [`BridgeTauriError::InvalidAction`] if `action` is neither.
#[TauriCommand]
pub async fn dispatch(
    action: Value,
    payload: Option<Value>,
    bridge: State<'_, Arc<BackendBridge>>,
) -> Result<(), BridgeTauriError> {
    let action = Dispatchable::Raw(action).into_action(payload).map_err(|e| {
        warn!("Rejected dispatch from webview: {}", e);
        BridgeTauriError::InvalidAction {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    debug!("Dispatching '{}' from webview", action.action_type);
    bridge.dispatch(action, None);
    Ok(())
}

/// Subscribe the calling webview window. It receives the current state right
/// away and every change after that.
#[TauriCommand]
pub async fn subscribe<R: Runtime>(
    app: AppHandle<R>,
    webview: Webview<R>,
    bridge: State<'_, Arc<BackendBridge>>,
) -> Result<(), BridgeTauriError> {
    let label = webview.label().to_string();
    debug!("Subscribing webview '{label}'");

    let consumer: Arc<dyn Consumer> = WebviewConsumer::new(app, label);
    bridge
        .subscribe(vec![consumer])
        .map_err(|e| BridgeTauriError::Core {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(())
}

/// Stop sending state to the calling webview window.
#[TauriCommand]
pub async fn unsubscribe<R: Runtime>(
    webview: Webview<R>,
    bridge: State<'_, Arc<BackendBridge>>,
) -> Result<(), BridgeTauriError> {
    debug!("Unsubscribing webview '{}'", webview.label());
    bridge.unsubscribe(vec![ConsumerId::new(webview.label())]);
    Ok(())
}
