//! Test doubles and common utilities for contract tests
//!
//! This module provides controllable collaborators so that detection,
//! reconciliation and bridging can be exercised without a real network.

#![allow(dead_code)]

use netstatus_core::error::{Error, Result};
use netstatus_core::traits::{
    ActiveInterface, CallbackContext, CallbackError, DocumentEvent, DocumentEvents,
    InterfaceEnumerator, ReachabilityProbe,
};
use netstatus_core::{
    BridgeAdapter, DetectionDriver, NetStatusConfig, ProbeConfig, StateReconciler, StrategyConfig,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A reachability probe whose answer the test controls
pub struct ControlledProbe {
    answer: Mutex<std::result::Result<bool, String>>,
    calls: AtomicUsize,
}

impl ControlledProbe {
    pub fn new(online: bool) -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new(Ok(online)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_online(&self, online: bool) {
        *self.answer.lock().unwrap() = Ok(online);
    }

    pub fn set_error(&self, message: &str) {
        *self.answer.lock().unwrap() = Err(message.to_string());
    }

    /// Number of times is_online() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ReachabilityProbe for ControlledProbe {
    async fn is_online(&self) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.lock().unwrap().clone().map_err(Error::probe)
    }

    fn probe_name(&self) -> &'static str {
        "controlled"
    }
}

/// An interface enumerator whose answer the test controls
pub struct ControlledInterfaces {
    answer: Mutex<std::result::Result<Option<ActiveInterface>, String>>,
}

impl ControlledInterfaces {
    /// Report an active interface with the given raw kind
    pub fn with_kind(kind: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new(Ok(Some(ActiveInterface::new("if0", kind)))),
        })
    }

    /// Report no active interface
    pub fn none() -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new(Ok(None)),
        })
    }

    pub fn set_kind(&self, kind: &str) {
        *self.answer.lock().unwrap() = Ok(Some(ActiveInterface::new("if0", kind)));
    }

    pub fn set_error(&self, message: &str) {
        *self.answer.lock().unwrap() = Err(message.to_string());
    }
}

#[async_trait::async_trait]
impl InterfaceEnumerator for ControlledInterfaces {
    async fn active_interface(&self) -> Result<Option<ActiveInterface>> {
        self.answer.lock().unwrap().clone().map_err(Error::interface)
    }
}

/// Callback recording everything it receives
#[derive(Default)]
pub struct RecordingCallback {
    pub progress: Mutex<Vec<Value>>,
    pub success: Mutex<Vec<Option<Value>>>,
    pub errors: Mutex<Vec<CallbackError>>,
}

impl RecordingCallback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn progress(&self) -> Vec<Value> {
        self.progress.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<Option<Value>> {
        self.success.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<CallbackError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn is_untouched(&self) -> bool {
        self.progress().is_empty() && self.successes().is_empty() && self.errors().is_empty()
    }
}

impl CallbackContext for RecordingCallback {
    fn progress(&self, data: Value) {
        self.progress.lock().unwrap().push(data);
    }

    fn success(&self, data: Option<Value>) {
        self.success.lock().unwrap().push(data);
    }

    fn error(&self, error: CallbackError) {
        self.errors.lock().unwrap().push(error);
    }
}

/// Document event sink recording fired events
#[derive(Default)]
pub struct RecordingEvents(Mutex<Vec<DocumentEvent>>);

impl RecordingEvents {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fired(&self) -> Vec<DocumentEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl DocumentEvents for RecordingEvents {
    fn fire(&self, event: DocumentEvent) {
        self.0.lock().unwrap().push(event);
    }
}

/// Build a driver over controlled collaborators
pub fn driver(probe: &Arc<ControlledProbe>, interfaces: &Arc<ControlledInterfaces>) -> Arc<DetectionDriver> {
    Arc::new(DetectionDriver::new(
        probe.clone(),
        interfaces.clone(),
        Arc::new(StateReconciler::new()),
        &ProbeConfig::default(),
    ))
}

/// Build an adapter over controlled collaborators
pub fn adapter(
    probe: &Arc<ControlledProbe>,
    interfaces: &Arc<ControlledInterfaces>,
    strategy: StrategyConfig,
) -> Arc<BridgeAdapter> {
    let config = NetStatusConfig {
        strategy,
        ..NetStatusConfig::default()
    };
    Arc::new(
        BridgeAdapter::from_config(probe.clone(), interfaces.clone(), &config)
            .expect("valid config"),
    )
}

/// Let spawned tasks run
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
