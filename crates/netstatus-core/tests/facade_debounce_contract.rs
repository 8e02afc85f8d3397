//! Contract Test: Façade Debounce & Readiness
//!
//! This test verifies the script-side façade end to end, over a local bridge.
//!
//! Constraints verified:
//! - A short "none" blip followed by a real type emits only `online`
//! - A lasting "none" emits exactly one `offline` after the debounce window
//! - The connection-ready signal fires exactly once, even on failure
//! - Host online signals are forwarded only when they change
//!
//! If this test fails, applications will see flapping connectivity events.

mod common;

use common::*;
use netstatus_core::traits::{CallbackContext, CallbackError, DocumentEvent, HostBridge};
use netstatus_core::{
    BridgeAdapter, ConnectionFacade, ConnectionType, FacadeConfig, HOST_READY, LocalBridge,
    ReadinessSignal, StrategyConfig,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    probe: Arc<ControlledProbe>,
    adapter: Arc<BridgeAdapter>,
    events: Arc<RecordingEvents>,
    facade: Arc<ConnectionFacade>,
}

fn fixture(online: bool, config: FacadeConfig) -> Fixture {
    let probe = ControlledProbe::new(online);
    let interfaces = ControlledInterfaces::with_kind("Wireless");
    let adapter = adapter(&probe, &interfaces, StrategyConfig::EventDriven);
    let events = RecordingEvents::new();
    let facade = ConnectionFacade::new(
        Arc::new(LocalBridge::new(adapter.clone())),
        events.clone(),
        config,
    );

    Fixture {
        probe,
        adapter,
        events,
        facade,
    }
}

#[tokio::test(start_paused = true)]
async fn short_offline_blip_is_suppressed() {
    let f = fixture(false, FacadeConfig::default());
    f.facade.start();
    settle().await;
    assert_eq!(f.facade.connection_type(), ConnectionType::None);
    assert!(!f.facade.is_online());

    tokio::time::sleep(Duration::from_millis(200)).await;
    f.probe.set_online(true);
    f.adapter.driver().detect_once().await;

    assert_eq!(f.facade.connection_type(), ConnectionType::Wifi);
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(f.events.fired(), vec![DocumentEvent::Online]);
}

#[tokio::test(start_paused = true)]
async fn lasting_offline_fires_once() {
    let f = fixture(true, FacadeConfig::default());
    f.facade.start();
    settle().await;
    assert_eq!(f.events.fired(), vec![DocumentEvent::Online]);

    f.probe.set_online(false);
    f.adapter.driver().detect_once().await;

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert_eq!(f.events.fired(), vec![DocumentEvent::Online]);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(
        f.events.fired(),
        vec![DocumentEvent::Online, DocumentEvent::Offline]
    );

    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert_eq!(f.events.fired().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn ready_fires_once_after_host_ready() {
    let f = fixture(true, FacadeConfig::default());
    let host_ready = ReadinessSignal::new(HOST_READY);

    let attached = f.facade.attach(host_ready.clone());
    settle().await;
    assert_eq!(f.probe.call_count(), 0);
    assert!(!f.facade.connection_ready().is_fired());

    host_ready.fire();
    attached.await.unwrap();
    f.facade.connection_ready().wait().await;
    assert_eq!(f.facade.connection_type(), ConnectionType::Wifi);

    // Later changes do not fire it again
    f.probe.set_online(false);
    f.adapter.driver().detect_once().await;
    assert!(!f.facade.connection_ready().fire());
}

#[tokio::test]
async fn ready_fires_when_bridge_fails() {
    struct FailingBridge;

    impl HostBridge for FailingBridge {
        fn exec(&self, _service: &str, action: &str, _args: Vec<Value>, callback: Arc<dyn CallbackContext>) {
            callback.error(CallbackError::new(format!("{} failed", action), "class not found"));
        }
    }

    let events = RecordingEvents::new();
    let facade = ConnectionFacade::new(Arc::new(FailingBridge), events.clone(), FacadeConfig::default());
    facade.start();

    assert!(facade.connection_ready().is_fired());
    assert_eq!(facade.connection_type(), ConnectionType::Unknown);
    assert!(events.fired().is_empty());
}

#[tokio::test]
async fn host_online_signal_is_forwarded_on_change() {
    let config = FacadeConfig {
        host_online_signals: true,
        ..FacadeConfig::default()
    };
    let f = fixture(true, config);

    f.facade.observe_navigator_online(true);
    settle().await;
    assert_eq!(f.adapter.driver().navigator_online(), None);

    f.facade.observe_navigator_online(false);
    settle().await;
    assert_eq!(f.adapter.driver().navigator_online(), Some(false));
    let probes = f.probe.call_count();
    let detections = f.adapter.driver().detection_count();

    f.facade.observe_navigator_online(false);
    settle().await;
    assert_eq!(f.adapter.driver().detection_count(), detections);
    assert_eq!(f.probe.call_count(), probes);
}
