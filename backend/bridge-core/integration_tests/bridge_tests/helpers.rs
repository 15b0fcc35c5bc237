//! Test helpers for bridge integration tests.
//!
//! - [`RecordingConsumer`]: a consumer that records every payload and can be
//!   told to die or to fail deliveries
//! - [`TestHost`]: a discovery source whose consumer list tests control
//! - counter store and bridge builders

use bridge_core::bridge::{BackendBridge, Consumer, ConsumerHost, ConsumerId};
use bridge_core::config::BridgeConfig;
use bridge_core::error::DeliveryError;
use bridge_core::registry::{AdapterOptions, StateManagerRegistry};
use bridge_core::store::{MemoryStore, reducer};
use bridge_core::value::StateValue;

use common::Action;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

pub const INCREMENT: &str = "COUNTER:INCREMENT";

type SendHook = Box<dyn Fn() + Send + Sync>;

pub struct RecordingConsumer {
    id: ConsumerId,
    destroyed: AtomicBool,
    failures_left: AtomicUsize,
    received: Mutex<Vec<(String, Value)>>,
    on_send: Mutex<Option<SendHook>>,
}

impl RecordingConsumer {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: ConsumerId::new(id),
            destroyed: AtomicBool::new(false),
            failures_left: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            on_send: Mutex::new(None),
        })
    }

    /// Fail the next `count` deliveries.
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub fn kill(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    pub fn on_send(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_send.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn channels(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(channel, _)| channel.clone())
            .collect()
    }

    /// The `counter` field of every payload received so far.
    pub fn counters(&self) -> Vec<i64> {
        self.payloads()
            .iter()
            .filter_map(|payload| payload["counter"].as_i64())
            .collect()
    }

    pub fn update_ids(&self) -> Vec<u64> {
        self.payloads()
            .iter()
            .filter_map(|payload| payload["__bridge_update_id"].as_u64())
            .collect()
    }
}

impl Consumer for RecordingConsumer {
    fn id(&self) -> ConsumerId {
        self.id.clone()
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn send(&self, channel: &str, payload: &Value) -> Result<(), DeliveryError> {
        if self.is_destroyed() {
            return Err(DeliveryError::destroyed(self.id.to_string()));
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DeliveryError::send(self.id.to_string(), "injected failure"));
        }

        self.received
            .lock()
            .unwrap()
            .push((channel.to_string(), payload.clone()));

        if let Some(hook) = self.on_send.lock().unwrap().as_ref() {
            hook();
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct TestHost {
    consumers: Mutex<Vec<Arc<dyn Consumer>>>,
}

impl TestHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self, consumer: Arc<dyn Consumer>) {
        self.consumers.lock().unwrap().push(consumer);
    }
}

impl ConsumerHost for TestHost {
    fn live_consumers(&self) -> Vec<Arc<dyn Consumer>> {
        self.consumers
            .lock()
            .unwrap()
            .iter()
            .filter(|consumer| !consumer.is_destroyed())
            .cloned()
            .collect()
    }
}

/// `{ counter: 0 }` driven by a reducer that understands [`INCREMENT`].
pub fn counter_bridge(config: BridgeConfig) -> (BackendBridge, Arc<MemoryStore>) {
    let store = MemoryStore::new(json!({ "counter": 0 }));
    let options = AdapterOptions::with_reducer(reducer(|state: &StateValue, action: &Action| {
        let counter = state.get("counter").and_then(StateValue::as_i64).unwrap_or(0);
        if action.action_type == INCREMENT {
            Ok(StateValue::from(json!({ "counter": counter + 1 })))
        } else {
            Ok(state.clone())
        }
    }));

    let registry = StateManagerRegistry::new();
    let bridge = BackendBridge::new(&registry, store.clone(), &options, config)
        .expect("Failed to create bridge");
    (bridge, store)
}

pub fn as_consumers(consumers: &[&Arc<RecordingConsumer>]) -> Vec<Arc<dyn Consumer>> {
    consumers
        .iter()
        .map(|consumer| Arc::clone(*consumer) as Arc<dyn Consumer>)
        .collect()
}

pub fn ids(names: &[&str]) -> Vec<ConsumerId> {
    names.iter().map(|name| ConsumerId::new(*name)).collect()
}
