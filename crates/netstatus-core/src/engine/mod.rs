//! Detection driver
//!
//! The DetectionDriver is responsible for:
//! - Asking the ReachabilityProbe whether the internet is reachable
//! - Asking the InterfaceEnumerator which interface is active
//! - Normalizing their answers (and failures) into a candidate state
//! - Feeding the candidate to the StateReconciler
//! - Running a detection schedule (polling or event-driven)
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────┐
//!   override ────► │ DetectionDriver  │ ◄──── Schedule (polling / event-driven)
//!                  └──────────────────┘
//!                           │
//!         ┌─────────────────┼──────────────────┐
//!         ▼                 ▼                  ▼
//! ┌──────────────┐  ┌─────────────────┐  ┌─────────────────┐
//! │ Reachability │  │ InterfaceEnum-  │  │ StateReconciler │
//! │ Probe        │  │ erator          │  │ (reconcile)     │
//! └──────────────┘  └─────────────────┘  └─────────────────┘
//! ```
//!
//! ## Detection Flow
//!
//! 1. Navigator-online override set to `false` → offline, no probing
//! 2. Probe fails, times out or answers `false` → offline
//! 3. Enumeration fails or finds nothing → online, `unknown`
//! 4. Otherwise → online, classified interface type
//! 5. Reconcile
//!
//! Detection never fails from the caller's point of view.

pub mod schedule;

use crate::config::{ProbeConfig, StrategyConfig};
use crate::connection::{ConnectionState, ConnectionType, classify};
use crate::error::Error;
use crate::reconciler::StateReconciler;
use crate::registry::SubscriberId;
use crate::traits::{InterfaceEnumerator, ReachabilityProbe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use schedule::{EventDrivenSchedule, PollingSchedule, Schedule};

/// Orchestrates the detection collaborators and feeds the reconciler
///
/// ## Lifecycle
///
/// 1. Create with [`DetectionDriver::new()`] and wrap in an `Arc`
/// 2. Either call [`DetectionDriver::detect_once()`] on demand, or
/// 3. Start a schedule with [`DetectionDriver::start()`] and keep the handle
/// 4. Stop with [`DriverHandle::stop()`]
///
/// ## Ordering
///
/// Overlapping `detect_once` calls are serialized: each detection (probe,
/// enumeration, reconciliation) completes before the next begins.
pub struct DetectionDriver {
    /// Internet reachability
    probe: Arc<dyn ReachabilityProbe>,

    /// Active interface lookup
    interfaces: Arc<dyn InterfaceEnumerator>,

    /// Last-state holder
    reconciler: Arc<StateReconciler>,

    /// Upper bound for one probe call
    probe_timeout: Duration,

    /// Script environment's own online signal, `None` until first set
    navigator_online: Mutex<Option<bool>>,

    /// Serializes detections
    detect_lock: tokio::sync::Mutex<()>,

    /// Trigger sender of the running schedule, if any
    triggers: Mutex<Option<mpsc::UnboundedSender<()>>>,

    /// Completed detections
    detections: AtomicU64,
}

impl DetectionDriver {
    /// Create a new detection driver
    ///
    /// # Parameters
    ///
    /// - `probe`: Reachability probe implementation
    /// - `interfaces`: Interface enumerator implementation
    /// - `reconciler`: Reconciler receiving every candidate
    /// - `config`: Probe settings
    pub fn new(
        probe: Arc<dyn ReachabilityProbe>,
        interfaces: Arc<dyn InterfaceEnumerator>,
        reconciler: Arc<StateReconciler>,
        config: &ProbeConfig,
    ) -> Self {
        Self {
            probe,
            interfaces,
            reconciler,
            probe_timeout: config.timeout(),
            navigator_online: Mutex::new(None),
            detect_lock: tokio::sync::Mutex::new(()),
            triggers: Mutex::new(None),
            detections: AtomicU64::new(0),
        }
    }

    pub fn reconciler(&self) -> &Arc<StateReconciler> {
        &self.reconciler
    }

    /// The navigator-online override, `None` if never set
    pub fn navigator_online(&self) -> Option<bool> {
        *self
            .navigator_online
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of detections completed so far
    pub fn detection_count(&self) -> u64 {
        self.detections.load(Ordering::SeqCst)
    }

    /// Run one detection and reconcile its result
    ///
    /// # Returns
    ///
    /// The last state after reconciliation
    pub async fn detect_once(&self) -> ConnectionState {
        let _guard = self.detect_lock.lock().await;
        self.detect_locked().await
    }

    /// Run one detection, report its type, then subscribe to later changes
    ///
    /// The initial report and the registration happen before any other
    /// detection can reconcile, so `report` sees every change after the
    /// type it was first given.
    ///
    /// # Returns
    ///
    /// The last state after reconciliation and the registered subscriber
    pub async fn detect_and_subscribe<F>(&self, report: F) -> (ConnectionState, SubscriberId)
    where
        F: Fn(ConnectionType) + Send + Sync + 'static,
    {
        let _guard = self.detect_lock.lock().await;
        let state = self.detect_locked().await;

        report(state.connection_type());
        let id = self
            .reconciler
            .subscribers()
            .register(move |connection_type: ConnectionType| {
                report(connection_type);
                Ok(())
            });

        (state, id)
    }

    /// Detection body; the caller holds `detect_lock`
    async fn detect_locked(&self) -> ConnectionState {
        let candidate = self.observe().await;
        let state = self.reconciler.reconcile(candidate).unwrap_or(candidate);

        self.detections.fetch_add(1, Ordering::SeqCst);
        state
    }

    /// Query the collaborators and build a candidate state
    async fn observe(&self) -> ConnectionState {
        if self.navigator_online() == Some(false) {
            debug!("Navigator reports offline, skipping reachability probe");
            return ConnectionState::offline();
        }

        let online = match tokio::time::timeout(self.probe_timeout, self.probe.is_online()).await
        {
            Ok(Ok(online)) => online,
            Ok(Err(e)) => {
                warn!("Failed to retrieve online status from {}: {}", self.probe.probe_name(), e);
                false
            }
            Err(_) => {
                let e = Error::ProbeTimeout(self.probe_timeout.as_millis() as u64);
                warn!("Failed to retrieve online status from {}: {}", self.probe.probe_name(), e);
                false
            }
        };

        debug!("Online status: {}", online);
        if !online {
            return ConnectionState::offline();
        }

        match self.interfaces.active_interface().await {
            Ok(Some(interface)) => {
                debug!(
                    "Active interface: {} ({})",
                    interface.name.as_deref().unwrap_or("?"),
                    interface.kind.as_deref().unwrap_or("?")
                );
                ConnectionState::online(classify(interface.kind.as_deref()))
            }
            Ok(None) => {
                debug!("No active interface");
                ConnectionState::online(ConnectionType::Unknown)
            }
            Err(e) => {
                warn!("Failed to retrieve active interface: {}", e);
                ConnectionState::online(ConnectionType::Unknown)
            }
        }
    }

    /// Apply the script environment's online signal and re-detect
    ///
    /// With a running schedule the re-detection goes through the schedule;
    /// otherwise it is spawned fire-and-forget.
    pub fn set_navigator_online(self: &Arc<Self>, online: bool) {
        let previous = self
            .navigator_online
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(online);
        debug!("Navigator online override: {:?} -> {}", previous, online);

        self.request_detection();
    }

    /// Ask for a detection as soon as possible, without waiting for it
    pub fn request_detection(self: &Arc<Self>) {
        {
            let triggers = self.triggers.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(tx) = triggers.as_ref() {
                if tx.send(()).is_ok() {
                    return;
                }
            }
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let driver = Arc::clone(self);
                runtime.spawn(async move {
                    driver.detect_once().await;
                });
            }
            Err(e) => {
                error!("Cannot update connection outside of a runtime: {}", e);
            }
        }
    }

    /// Start the schedule selected by `strategy`
    ///
    /// Runs a detection immediately, then according to the schedule, until
    /// the returned handle is stopped or dropped.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start(self: &Arc<Self>, strategy: &StrategyConfig) -> DriverHandle {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let mut schedule = schedule::from_config(strategy, trigger_rx);
        let name = schedule.name();

        if self
            .triggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(trigger_tx.clone())
            .is_some()
        {
            warn!("Starting a {} schedule while another schedule is running", name);
        }

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let driver = Arc::clone(self);

        let task = tokio::spawn(async move {
            info!("Starting {} detection schedule", name);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!("Stopping {} detection schedule", name);
                        break;
                    }

                    due = schedule.next_due() => {
                        if !due {
                            debug!("{} schedule ended", name);
                            break;
                        }
                        driver.detect_once().await;
                    }
                }
            }
        });

        DriverHandle {
            driver: Arc::clone(self),
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
            triggers: trigger_tx,
            strategy: name,
        }
    }

    /// Forget the trigger sender if it is still `own`
    fn clear_triggers(&self, own: &mpsc::UnboundedSender<()>) {
        let mut triggers = self.triggers.lock().unwrap_or_else(PoisonError::into_inner);
        if triggers.as_ref().is_some_and(|tx| tx.same_channel(own)) {
            triggers.take();
        }
    }
}

/// Handle to a running detection schedule
///
/// [`DriverHandle::stop`] ends the schedule and waits for it; dropping the
/// handle aborts the background task instead.
pub struct DriverHandle {
    driver: Arc<DetectionDriver>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    /// Trigger sender this schedule listens on
    triggers: mpsc::UnboundedSender<()>,
    strategy: &'static str,
}

impl DriverHandle {
    /// Strategy name of the running schedule
    pub fn strategy(&self) -> &'static str {
        self.strategy
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the schedule and wait for its task to finish
    ///
    /// A detection in progress is allowed to complete first.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Detection schedule task failed: {}", e);
            }
        }

        self.driver.clear_triggers(&self.triggers);
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.driver.clear_triggers(&self.triggers);
        }
    }
}
