//! The broadcast actor.
//!
//! Owns the tracked-consumer set. Every mutation of that set and every
//! delivery happens on this task, one command at a time, so broadcasts leave
//! in the order the store changed.

use crate::bridge::consumer::{Consumer, ConsumerHost, ConsumerId};
use crate::config::BridgeConfig;
use crate::serializer::to_wire;
use crate::value::StateValue;

use common::protocol::UPDATE_ID_KEY;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::time::{MissedTickBehavior, interval};

pub(crate) enum BridgeCommand {
    /// The state manager reported a change.
    Broadcast(StateValue),

    Subscribe(Vec<Arc<dyn Consumer>>),

    Unsubscribe(Vec<ConsumerId>),

    /// Host runtime announced a new surface.
    ConsumerCreated(Arc<dyn Consumer>),

    /// Host runtime announced a surface closed.
    ConsumerClosed(ConsumerId),

    AttachHost(Arc<dyn ConsumerHost>),

    /// Liveness filter plus discovery reconciliation.
    Sweep,

    ConsumerIds(oneshot::Sender<Vec<ConsumerId>>),

    Destroy,
}

pub(crate) struct BridgeActor {
    config: BridgeConfig,
    consumers: BTreeMap<ConsumerId, Arc<dyn Consumer>>,
    host: Option<Arc<dyn ConsumerHost>>,
    /// Sanitized state as of the last processed change, without metadata.
    current: Value,
    update_id: u64,
    destroyed: Arc<AtomicBool>,
}

impl BridgeActor {
    pub(crate) fn new(initial: Value, config: BridgeConfig, destroyed: Arc<AtomicBool>) -> Self {
        Self {
            config,
            consumers: BTreeMap::new(),
            host: None,
            current: initial,
            update_id: 0,
            destroyed,
        }
    }

    pub(crate) async fn run(mut self, mut commands: UnboundedReceiver<BridgeCommand>) {
        info!("Bridge actor started");

        while let Some(command) = commands.recv().await {
            if !self.handle(command) {
                break;
            }
        }

        self.consumers.clear();
        self.host = None;
        info!("Bridge actor stopped");
    }

    /// Returns `false` when the actor should stop.
    ///
    /// Commands queued before a destroy are dropped, not processed.
    fn handle(&mut self, command: BridgeCommand) -> bool {
        if self.destroyed.load(Ordering::SeqCst) {
            return false;
        }

        match command {
            BridgeCommand::Broadcast(state) => self.broadcast(&state),
            BridgeCommand::Subscribe(consumers) => {
                for consumer in consumers {
                    self.track(consumer);
                }
            }
            BridgeCommand::Unsubscribe(ids) => {
                for id in ids {
                    self.untrack(&id, "unsubscribed");
                }
            }
            BridgeCommand::ConsumerCreated(consumer) => self.track(consumer),
            BridgeCommand::ConsumerClosed(id) => self.untrack(&id, "closed"),
            BridgeCommand::AttachHost(host) => {
                info!("Consumer host attached");
                self.host = Some(host);
                self.sweep();
            }
            BridgeCommand::Sweep => self.sweep(),
            BridgeCommand::ConsumerIds(reply) => {
                let _ = reply.send(self.consumers.keys().cloned().collect());
            }
            BridgeCommand::Destroy => return false,
        }

        true
    }

    fn broadcast(&mut self, state: &StateValue) {
        let wire = to_wire(state);

        if self.config.dedupe_broadcasts && self.current == wire {
            debug!("Skipping duplicate broadcast");
            return;
        }

        self.update_id += 1;
        let payload = with_update_id(wire.clone(), self.update_id);
        self.current = wire;

        self.prune_destroyed();

        let failed: Vec<ConsumerId> = self
            .consumers
            .values()
            .filter(|consumer| !self.deliver(consumer.as_ref(), &payload))
            .map(|consumer| consumer.id())
            .collect();

        for id in failed {
            self.untrack(&id, "delivery failed");
        }

        debug!(
            "Broadcast update {} to {} consumer(s)",
            self.update_id,
            self.consumers.len()
        );
    }

    /// Add a consumer and hand it the current snapshot straight away.
    ///
    /// The snapshot is the state of the last processed change, so changes
    /// still queued behind this command follow it in order.
    fn track(&mut self, consumer: Arc<dyn Consumer>) {
        let id = consumer.id();

        if self.consumers.contains_key(&id) {
            debug!("Consumer '{id}' already tracked");
            return;
        }

        if consumer.is_destroyed() {
            debug!("Not tracking destroyed consumer '{id}'");
            return;
        }

        let snapshot = with_update_id(self.current.clone(), self.update_id);
        if self.deliver(consumer.as_ref(), &snapshot) {
            info!("Consumer '{id}' subscribed");
            self.consumers.insert(id, consumer);
        }
    }

    fn untrack(&mut self, id: &ConsumerId, reason: &str) {
        if self.consumers.remove(id).is_some() {
            info!("Consumer '{id}' removed ({reason})");
        }
    }

    fn prune_destroyed(&mut self) {
        let before = self.consumers.len();
        self.consumers.retain(|_, consumer| !consumer.is_destroyed());

        let pruned = before - self.consumers.len();
        if pruned > 0 {
            info!("Pruned {pruned} destroyed consumer(s)");
        }
    }

    fn sweep(&mut self) {
        self.prune_destroyed();

        let Some(host) = self.host.clone() else {
            return;
        };

        for consumer in host.live_consumers() {
            if !self.consumers.contains_key(&consumer.id()) {
                debug!("Discovered untracked consumer '{}'", consumer.id());
                self.track(consumer);
            }
        }
    }

    /// Send with at most one retry. Returns `false` if the consumer should be
    /// evicted.
    fn deliver(&self, consumer: &dyn Consumer, payload: &Value) -> bool {
        let channel = self.config.event_name.as_str();

        let Err(first) = consumer.send(channel, payload) else {
            return true;
        };

        if !self.config.retry_failed_delivery || consumer.is_destroyed() {
            warn!("Delivery to '{}' failed: {first}", consumer.id());
            return false;
        }

        match consumer.send(channel, payload) {
            Ok(()) => {
                debug!("Delivery to '{}' succeeded on retry", consumer.id());
                true
            }
            Err(e) => {
                warn!("Delivery to '{}' failed after retry: {e}", consumer.id());
                false
            }
        }
    }
}

fn with_update_id(mut snapshot: Value, update_id: u64) -> Value {
    if let Value::Object(object) = &mut snapshot {
        object.insert(UPDATE_ID_KEY.to_string(), Value::from(update_id));
    }
    snapshot
}

/// Enqueue a sweep every `period` until the actor goes away.
pub(crate) async fn sweep_timer(commands: UnboundedSender<BridgeCommand>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if commands.send(BridgeCommand::Sweep).is_err() {
            break;
        }
    }
}
