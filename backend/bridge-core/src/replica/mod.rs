//! Consumer side: the read replica a display surface renders from.

mod client;

pub use client::{ActionChannel, ConsumerClient};

use crate::bridge::{Consumer, ConsumerId};
use crate::error::DeliveryError;
use crate::store::{Listener, ListenerSet, Unsubscribe};
use crate::sync::lock;

use common::BridgeStatus;
use common::protocol::{STATUS_KEY, UPDATE_ID_KEY};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Default)]
struct ReplicaState {
    status: BridgeStatus,
    state: Option<Value>,
    last_update_id: Option<u64>,
    error: Option<String>,
}

/// Local copy of backend state fed by snapshots.
pub struct Replica {
    inner: Mutex<ReplicaState>,
    listeners: Arc<ListenerSet<Value>>,
}

impl Replica {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(ReplicaState::default()),
            listeners: ListenerSet::new(),
        })
    }

    /// Mark the replica as waiting for its first snapshot.
    pub fn begin_initializing(&self) {
        let state = {
            let mut inner = lock(&self.inner);
            if inner.status != BridgeStatus::Uninitialized {
                return;
            }
            inner.status = BridgeStatus::Initializing;
            status_object(inner.status)
        };

        self.listeners.notify(&state);
    }

    /// Replace local state with `snapshot`.
    ///
    /// The update id is recorded and stripped. Listeners see the stripped
    /// snapshot.
    pub fn apply_snapshot(&self, mut snapshot: Value) {
        let update_id = match &mut snapshot {
            Value::Object(object) => object.remove(UPDATE_ID_KEY).and_then(|id| id.as_u64()),
            _ => None,
        };

        {
            let mut inner = lock(&self.inner);
            if let (Some(previous), Some(current)) = (inner.last_update_id, update_id) {
                if current < previous {
                    debug!("Snapshot {current} arrived after {previous}");
                }
            }

            inner.status = BridgeStatus::Ready;
            inner.state = Some(snapshot.clone());
            inner.error = None;
            if update_id.is_some() {
                inner.last_update_id = update_id;
            }
        }

        self.listeners.notify(&snapshot);
    }

    /// Move to the error status. Keeps the last good state.
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("Replica failed: {message}");

        let state = {
            let mut inner = lock(&self.inner);
            inner.status = BridgeStatus::Error;
            inner.error = Some(message);
            inner
                .state
                .clone()
                .unwrap_or_else(|| status_object(BridgeStatus::Error))
        };

        self.listeners.notify(&state);
    }

    pub fn status(&self) -> BridgeStatus {
        lock(&self.inner).status
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.inner).error.clone()
    }

    /// Last snapshot, or `{"__bridge_status": <status>}` before the first one.
    pub fn state(&self) -> Value {
        let inner = lock(&self.inner);
        inner
            .state
            .clone()
            .unwrap_or_else(|| status_object(inner.status))
    }

    pub fn last_update_id(&self) -> Option<u64> {
        lock(&self.inner).last_update_id
    }

    pub fn subscribe(&self, listener: Listener<Value>) -> Unsubscribe {
        self.listeners.add(listener)
    }
}

fn status_object(status: BridgeStatus) -> Value {
    let mut object = Map::new();
    object.insert(STATUS_KEY.to_string(), Value::from(status.as_str()));
    Value::Object(object)
}

/// In-process [`Consumer`] backed by a [`Replica`].
///
/// Delivery applies the snapshot directly. After [`close`](Self::close) the
/// consumer reports itself destroyed and rejects deliveries.
pub struct LocalConsumer {
    id: ConsumerId,
    replica: Arc<Replica>,
    closed: AtomicBool,
}

impl LocalConsumer {
    pub fn new(replica: Arc<Replica>) -> Arc<Self> {
        Self::with_id(ConsumerId::new(Uuid::new_v4().to_string()), replica)
    }

    pub fn with_id(id: impl Into<ConsumerId>, replica: Arc<Replica>) -> Arc<Self> {
        replica.begin_initializing();
        Arc::new(Self {
            id: id.into(),
            replica,
            closed: AtomicBool::new(false),
        })
    }

    pub fn replica(&self) -> &Arc<Replica> {
        &self.replica
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Consumer for LocalConsumer {
    fn id(&self) -> ConsumerId {
        self.id.clone()
    }

    fn is_destroyed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn send(&self, _channel: &str, payload: &Value) -> Result<(), DeliveryError> {
        if self.is_destroyed() {
            return Err(DeliveryError::destroyed(self.id.to_string()));
        }

        self.replica.apply_snapshot(payload.clone());
        Ok(())
    }
}
