use crate::bridge::actor::BridgeCommand;
use crate::bridge::consumer::ConsumerId;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use tokio::sync::mpsc::UnboundedSender;

/// Returned by [`CoreBridge::subscribe`](crate::bridge::CoreBridge::subscribe).
///
/// [`unsubscribe`](SubscriptionHandle::unsubscribe) removes exactly the
/// consumers this handle was created for. It is idempotent and safe to call
/// from inside a delivery callback. Dropping the handle does nothing.
pub struct SubscriptionHandle {
    consumer_ids: Vec<ConsumerId>,
    commands: UnboundedSender<BridgeCommand>,
    released: AtomicBool,
    bridge_destroyed: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    pub(crate) fn new(
        consumer_ids: Vec<ConsumerId>,
        commands: UnboundedSender<BridgeCommand>,
        bridge_destroyed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            consumer_ids,
            commands,
            released: AtomicBool::new(false),
            bridge_destroyed,
        }
    }

    pub fn consumer_ids(&self) -> &[ConsumerId] {
        &self.consumer_ids
    }

    pub fn unsubscribe(&self) {
        if self.released.swap(true, Ordering::SeqCst) || self.bridge_destroyed.load(Ordering::SeqCst) {
            return;
        }

        debug!("Unsubscribing {} consumer(s)", self.consumer_ids.len());
        // Fails only if the actor is gone, in which case nothing is tracked.
        let _ = self
            .commands
            .send(BridgeCommand::Unsubscribe(self.consumer_ids.clone()));
    }
}
