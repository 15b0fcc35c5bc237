//! Backend side of the bridge.
//!
//! [`CoreBridge`] listens to one [`StateManager`] and pushes sanitized
//! snapshots to every tracked [`Consumer`]. [`BackendBridge`] bundles it with
//! a [`Dispatcher`] for the common "one store, one bridge" setup.
//!
//! # Architecture
//!
//! All consumer bookkeeping lives on a single actor task fed by an unbounded
//! channel:
//! - store listeners enqueue `Broadcast` synchronously, so delivery order is
//!   change order and delivery happens at least one scheduler turn later
//! - `subscribe`, host events and the sweep timer enqueue their own commands
//! - `destroy` flips a flag first, so the bridge refuses work immediately even
//!   while teardown is still queued

mod actor;
mod consumer;
mod handle;

pub use consumer::{Consumer, ConsumerHost, ConsumerId};
pub use handle::SubscriptionHandle;

use actor::{BridgeActor, BridgeCommand, sweep_timer};

use crate::adapters::StateManager;
use crate::config::BridgeConfig;
use crate::dispatch::{Dispatchable, Dispatcher};
use crate::error::{BridgeError, CoreError};
use crate::registry::{AdapterOptions, StateManagerRegistry, global};
use crate::serializer::to_wire;
use crate::store::{BackendStore, Listener, Unsubscribe};
use crate::sync::lock;
use crate::value::StateValue;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

pub struct CoreBridge {
    commands: mpsc::UnboundedSender<BridgeCommand>,
    destroyed: Arc<AtomicBool>,
    state_subscription: Mutex<Option<Unsubscribe>>,
    config: BridgeConfig,
}

impl CoreBridge {
    /// Start a bridge over `manager`.
    ///
    /// Spawns the broadcast actor and the sweep timer on the current tokio
    /// runtime and subscribes once to the manager's change stream.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Runtime`] when called outside a tokio runtime.
    pub fn new(manager: Arc<dyn StateManager>, config: BridgeConfig) -> Result<Self, BridgeError> {
        let runtime = Handle::try_current()
            .map_err(|e| BridgeError::runtime(format!("no tokio runtime: {e}")))?;

        let (commands, receiver) = mpsc::unbounded_channel();

        // Subscribe before reading the initial state so no change falls between.
        let broadcasts = commands.clone();
        let state_subscription = manager.subscribe(Arc::new(move |state: &StateValue| {
            let _ = broadcasts.send(BridgeCommand::Broadcast(state.clone()));
        }));
        let initial = to_wire(&manager.get_state());
        let destroyed = Arc::new(AtomicBool::new(false));

        runtime.spawn(
            BridgeActor::new(initial, config.clone(), Arc::clone(&destroyed)).run(receiver),
        );
        runtime.spawn(sweep_timer(commands.clone(), config.sweep_interval()));

        info!(
            "Bridge created (event '{}', sweep every {} ms)",
            config.event_name, config.sweep_interval_ms
        );

        Ok(Self {
            commands,
            destroyed,
            state_subscription: Mutex::new(Some(state_subscription)),
            config,
        })
    }

    /// Track `consumers` and send each newcomer the current snapshot.
    ///
    /// Consumers already tracked are left alone. The returned handle removes
    /// exactly these consumers.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Destroyed`] once [`destroy`](Self::destroy) ran.
    pub fn subscribe(
        &self,
        consumers: Vec<Arc<dyn Consumer>>,
    ) -> Result<SubscriptionHandle, BridgeError> {
        let ids = consumers.iter().map(|consumer| consumer.id()).collect();
        self.send(BridgeCommand::Subscribe(consumers))?;

        Ok(SubscriptionHandle::new(
            ids,
            self.commands.clone(),
            Arc::clone(&self.destroyed),
        ))
    }

    /// Stop tracking `ids`. Unknown ids are ignored.
    pub fn unsubscribe(&self, ids: Vec<ConsumerId>) {
        self.send_quietly(BridgeCommand::Unsubscribe(ids));
    }

    /// Event-driven discovery: the host created a surface.
    pub fn handle_consumer_created(&self, consumer: Arc<dyn Consumer>) {
        self.send_quietly(BridgeCommand::ConsumerCreated(consumer));
    }

    /// Event-driven removal: the host closed a surface.
    pub fn handle_consumer_closed(&self, id: ConsumerId) {
        self.send_quietly(BridgeCommand::ConsumerClosed(id));
    }

    /// Use `host` as the discovery source for sweeps. Runs one sweep right away.
    pub fn attach_host(&self, host: Arc<dyn ConsumerHost>) {
        self.send_quietly(BridgeCommand::AttachHost(host));
    }

    /// Queue a liveness filter and discovery pass outside the timer.
    pub fn sweep(&self) {
        self.send_quietly(BridgeCommand::Sweep);
    }

    /// Ids of the consumers tracked once every earlier command has been
    /// processed. Empty after destruction.
    pub async fn consumer_ids(&self) -> Vec<ConsumerId> {
        let (reply, response) = oneshot::channel();
        if self.send(BridgeCommand::ConsumerIds(reply)).is_err() {
            return Vec::new();
        }
        response.await.unwrap_or_default()
    }

    /// Detach from the state manager, drop every consumer and stop the actor.
    ///
    /// Idempotent and safe to call from a delivery callback.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(unsubscribe) = lock(&self.state_subscription).take() {
            unsubscribe();
        }

        let _ = self.commands.send(BridgeCommand::Destroy);
        info!("Bridge destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[track_caller]
    fn send(&self, command: BridgeCommand) -> Result<(), BridgeError> {
        if self.is_destroyed() {
            return Err(BridgeError::destroyed("bridge no longer accepts commands"));
        }

        self.commands
            .send(command)
            .map_err(|_| BridgeError::runtime("bridge actor is not running"))
    }

    fn send_quietly(&self, command: BridgeCommand) {
        if let Err(e) = self.send(command) {
            debug!("Ignoring bridge command: {e}");
        }
    }
}

impl Drop for CoreBridge {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// One store wired to its consumers.
pub struct BackendBridge {
    manager: Arc<dyn StateManager>,
    dispatcher: Dispatcher,
    core: CoreBridge,
}

/// Build a bridge for `store` using the process-wide registry.
///
/// # Errors
///
/// - [`CoreError::Store`] if the store shape is not recognized
/// - [`CoreError::Bridge`] when called outside a tokio runtime
#[track_caller]
pub fn create_bridge(
    store: Arc<dyn BackendStore>,
    options: &AdapterOptions,
    config: BridgeConfig,
) -> Result<BackendBridge, CoreError> {
    BackendBridge::new(global(), store, options, config)
}

impl BackendBridge {
    /// Build a bridge for `store`, resolving its manager through `registry`.
    ///
    /// # Errors
    ///
    /// Same as [`create_bridge`].
    #[track_caller]
    pub fn new(
        registry: &StateManagerRegistry,
        store: Arc<dyn BackendStore>,
        options: &AdapterOptions,
        config: BridgeConfig,
    ) -> Result<Self, CoreError> {
        let manager = registry.get_or_create(store, options)?;
        Ok(Self::from_manager(manager, config)?)
    }

    pub fn from_manager(
        manager: Arc<dyn StateManager>,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        let core = CoreBridge::new(Arc::clone(&manager), config)?;

        Ok(Self {
            dispatcher: Dispatcher::new(Arc::clone(&manager)),
            manager,
            core,
        })
    }

    /// Current sanitized snapshot.
    pub fn get_state(&self) -> Value {
        to_wire(&self.manager.get_state())
    }

    /// Fire-and-forget; see [`Dispatcher::dispatch`].
    pub fn dispatch(&self, dispatchable: impl Into<Dispatchable>, payload: Option<Value>) {
        self.dispatcher.dispatch(dispatchable, payload);
    }

    /// In-process listener receiving sanitized snapshots synchronously on
    /// every change.
    pub fn subscribe_state(&self, listener: Listener<Value>) -> Unsubscribe {
        self.manager
            .subscribe(Arc::new(move |state: &StateValue| listener(&to_wire(state))))
    }

    pub fn subscribe(
        &self,
        consumers: Vec<Arc<dyn Consumer>>,
    ) -> Result<SubscriptionHandle, BridgeError> {
        self.core.subscribe(consumers)
    }

    pub fn unsubscribe(&self, ids: Vec<ConsumerId>) {
        self.core.unsubscribe(ids);
    }

    pub fn handle_consumer_created(&self, consumer: Arc<dyn Consumer>) {
        self.core.handle_consumer_created(consumer);
    }

    pub fn handle_consumer_closed(&self, id: ConsumerId) {
        self.core.handle_consumer_closed(id);
    }

    pub fn attach_host(&self, host: Arc<dyn ConsumerHost>) {
        self.core.attach_host(host);
    }

    pub fn sweep(&self) {
        self.core.sweep();
    }

    pub async fn consumer_ids(&self) -> Vec<ConsumerId> {
        self.core.consumer_ids().await
    }

    pub fn destroy(&self) {
        self.core.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.core.is_destroyed()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn core(&self) -> &CoreBridge {
        &self.core
    }

    pub fn state_manager(&self) -> &Arc<dyn StateManager> {
        &self.manager
    }
}
