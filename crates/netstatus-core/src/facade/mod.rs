//! Script-side façade
//!
//! The `navigator.connection`-like object application code reads. It is kept
//! in sync through the host bridge and turns connection types into
//! application-wide `online` / `offline` document events.
//!
//! ## Lifecycle
//!
//! 1. [`ConnectionFacade::attach`] waits for the host readiness signal
//! 2. [`ConnectionFacade::start`] requests `getConnectionInfo` through the bridge
//! 3. Every delivered type updates [`ConnectionFacade::connection_type`]
//! 4. The connection-ready signal fires exactly once, on the first answer or
//!    on failure, so initialization never hangs on network detection
//!
//! ## Debounce
//!
//! A `none` type arms a timer; `offline` is emitted only if the timer fires
//! before any other type arrives. A non-`none` type cancels a pending timer
//! and emits `online` immediately.

pub mod readiness;

use crate::config::FacadeConfig;
use crate::connection::ConnectionType;
use crate::traits::{
    CallbackContext, CallbackError, DocumentEvent, DocumentEvents, HostBridge, SERVICE_NAME,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use readiness::{CONNECTION_READY, HOST_READY, ReadinessSignal};

const GET_CONNECTION_INFO: &str = "getConnectionInfo";
const SET_NAVIGATOR_ONLINE_STATUS: &str = "setNavigatorOnlineStatus";

/// Pending `offline` commitment
#[derive(Default)]
struct PendingOffline {
    /// Bumped whenever a pending timer is superseded
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Web-facing connection object
pub struct ConnectionFacade {
    /// Host bridge used for every native call
    bridge: Arc<dyn HostBridge>,

    /// Sink for `online` / `offline`
    events: Arc<dyn DocumentEvents>,

    config: FacadeConfig,

    /// `navigator.connection.type`
    connection_type: Mutex<ConnectionType>,

    pending_offline: Mutex<PendingOffline>,

    /// Fired once connection info is first available (or failed)
    connection_ready: ReadinessSignal,

    /// Last observed host online signal
    navigator_online: Mutex<bool>,
}

impl ConnectionFacade {
    /// Create a façade
    ///
    /// # Parameters
    ///
    /// - `bridge`: Host bridge to reach the `NetworkStatus` service
    /// - `events`: Sink for document events
    /// - `config`: Façade settings
    pub fn new(
        bridge: Arc<dyn HostBridge>,
        events: Arc<dyn DocumentEvents>,
        config: FacadeConfig,
    ) -> Arc<Self> {
        let navigator_online = config.initial_navigator_online;
        Arc::new(Self {
            bridge,
            events,
            config,
            connection_type: Mutex::new(ConnectionType::Unknown),
            pending_offline: Mutex::new(PendingOffline::default()),
            connection_ready: ReadinessSignal::new(CONNECTION_READY),
            navigator_online: Mutex::new(navigator_online),
        })
    }

    /// Current `navigator.connection.type`
    pub fn connection_type(&self) -> ConnectionType {
        *self
            .connection_type
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// `navigator.onLine` for hosts without a native one
    pub fn is_online(&self) -> bool {
        !self.connection_type().is_none()
    }

    /// Signal fired once connection info is first known
    pub fn connection_ready(&self) -> &ReadinessSignal {
        &self.connection_ready
    }

    /// Start once the host is ready
    ///
    /// Must be called within a Tokio runtime.
    pub fn attach(self: &Arc<Self>, host_ready: ReadinessSignal) -> JoinHandle<()> {
        let facade = Arc::clone(self);
        tokio::spawn(async move {
            host_ready.wait().await;
            debug!("{} fired, requesting connection info", host_ready.name());
            facade.start();
        })
    }

    /// Request connection info through the bridge
    pub fn start(self: &Arc<Self>) {
        let callback = Arc::new(FacadeCallback {
            facade: Arc::downgrade(self),
        });

        self.bridge
            .exec(SERVICE_NAME, GET_CONNECTION_INFO, Vec::new(), callback);
    }

    /// Direct access to `getConnectionInfo`
    #[deprecated(note = "read `connection_type()` / `is_online()` instead")]
    pub fn get_info(&self, callback: Arc<dyn CallbackContext>) {
        warn!(
            "Use of deprecated method get_info(). \
             Better use is_online() and connection_type() to obtain current network state."
        );
        self.bridge
            .exec(SERVICE_NAME, GET_CONNECTION_INFO, Vec::new(), callback);
    }

    /// Apply a connection type delivered by the bridge
    pub fn handle_type(self: &Arc<Self>, connection_type: ConnectionType) {
        *self
            .connection_type
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = connection_type;

        if connection_type.is_none() {
            self.arm_offline();
        } else {
            self.cancel_offline();
            self.events.fire(DocumentEvent::Online);
        }

        if self.connection_ready.fire() {
            info!("Connection subsystem ready (type: {})", connection_type);
        }
    }

    fn handle_error(&self, error: CallbackError) {
        error!("Error initializing network connection: {}", error);
        if self.connection_ready.fire() {
            info!("Connection subsystem ready without connection info");
        }
    }

    /// Arm (or re-arm) the offline debounce timer
    fn arm_offline(self: &Arc<Self>) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("No runtime for offline debounce, firing immediately: {}", e);
                self.events.fire(DocumentEvent::Offline);
                return;
            }
        };

        let mut pending = self
            .pending_offline
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.generation += 1;
        if let Some(previous) = pending.timer.take() {
            previous.abort();
        }

        let generation = pending.generation;
        let facade = Arc::downgrade(self);
        let debounce = self.config.debounce();
        pending.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Some(facade) = facade.upgrade() {
                facade.commit_offline(generation);
            }
        }));
        debug!("Offline debounce armed ({:?})", debounce);
    }

    fn cancel_offline(&self) {
        let mut pending = self
            .pending_offline
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.generation += 1;
        if let Some(timer) = pending.timer.take() {
            timer.abort();
            debug!("Pending offline event cancelled");
        }
    }

    fn commit_offline(&self, generation: u64) {
        {
            let mut pending = self
                .pending_offline
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if pending.generation != generation || !self.connection_type().is_none() {
                return;
            }
            pending.timer = None;
        }

        self.events.fire(DocumentEvent::Offline);
    }

    /// Observe the host's own online signal
    ///
    /// Only in host-integration mode, and only when the value differs from
    /// the previously observed one, is it forwarded to the bridge.
    pub fn observe_navigator_online(&self, online: bool) {
        if !self.config.host_online_signals {
            debug!("Host online signals disabled, ignoring navigator online = {}", online);
            return;
        }

        {
            let mut last = self
                .navigator_online
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *last == online {
                return;
            }
            *last = online;
        }

        debug!("Forwarding navigator online = {}", online);
        self.bridge.exec(
            SERVICE_NAME,
            SET_NAVIGATOR_ONLINE_STATUS,
            vec![Value::Bool(online)],
            Arc::new(ForwardCallback),
        );
    }
}

impl Drop for ConnectionFacade {
    fn drop(&mut self) {
        let pending = self
            .pending_offline
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
    }
}

/// Receives `getConnectionInfo` results for the façade
struct FacadeCallback {
    facade: Weak<ConnectionFacade>,
}

impl FacadeCallback {
    fn deliver(&self, data: Value) {
        let Some(facade) = self.facade.upgrade() else {
            return;
        };

        let connection_type = match data.as_str().map(str::parse::<ConnectionType>) {
            Some(Ok(connection_type)) => connection_type,
            _ => {
                warn!("Unrecognized connection info {}, using unknown", data);
                ConnectionType::Unknown
            }
        };

        facade.handle_type(connection_type);
    }
}

impl CallbackContext for FacadeCallback {
    fn progress(&self, data: Value) {
        self.deliver(data);
    }

    fn success(&self, data: Option<Value>) {
        if let Some(data) = data {
            self.deliver(data);
        }
    }

    fn error(&self, error: CallbackError) {
        if let Some(facade) = self.facade.upgrade() {
            facade.handle_error(error);
        }
    }
}

/// Logs the outcome of a forwarded online signal
struct ForwardCallback;

impl CallbackContext for ForwardCallback {
    fn progress(&self, _data: Value) {}

    fn success(&self, _data: Option<Value>) {}

    fn error(&self, error: CallbackError) {
        error!("Cannot set navigator online status: {}", error);
    }
}
