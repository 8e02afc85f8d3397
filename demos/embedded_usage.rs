//! Minimal embedding example for netstatus-core
//!
//! Wires a detection driver, the bridge adapter, an in-process host bridge
//! and the script-side façade together, then flips connectivity a few times
//! to show debounced `online` / `offline` events.
//!
//! ```text
//! embedded_usage           # simulated network
//! embedded_usage --live    # HTTP probe + /proc interface lookup
//! ```
//!
//! Set `NETSTATUS_LOG_LEVEL` (trace, debug, info, warn, error) to change verbosity.

use netstatus_core::traits::{
    ActiveInterface, DocumentEvent, DocumentEvents, InterfaceEnumerator, ReachabilityProbe,
};
use netstatus_core::{
    BridgeAdapter, ConnectionFacade, HOST_READY, LocalBridge, NetStatusConfig, ReadinessSignal,
};
use netstatus_iface_procfs::ProcfsInterfaceEnumerator;
use netstatus_probe_http::HttpReachabilityProbe;
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Simulated network the demo can switch on and off
#[derive(Default)]
struct SimulatedNetwork {
    online: AtomicBool,
}

impl SimulatedNetwork {
    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ReachabilityProbe for SimulatedNetwork {
    async fn is_online(&self) -> netstatus_core::Result<bool> {
        Ok(self.online.load(Ordering::SeqCst))
    }

    fn probe_name(&self) -> &'static str {
        "simulated"
    }
}

#[async_trait::async_trait]
impl InterfaceEnumerator for SimulatedNetwork {
    async fn active_interface(&self) -> netstatus_core::Result<Option<ActiveInterface>> {
        Ok(Some(ActiveInterface::new("wlan0", "Wireless")))
    }
}

/// Prints document events as the application would receive them
struct PrintingEvents;

impl DocumentEvents for PrintingEvents {
    fn fire(&self, event: DocumentEvent) {
        println!("[Document] {}", event);
    }
}

fn log_level() -> Level {
    match env::var("NETSTATUS_LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(log_level()).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let live = env::args().any(|arg| arg == "--live");
    let config = NetStatusConfig::from_json_str(
        r#"{"strategy": {"type": "polling", "interval_ms": 1000}, "facade": {"debounce_ms": 500}}"#,
    )?;

    println!("=== Embedded netstatus-core Example ===\n");

    let network = Arc::new(SimulatedNetwork::default());
    network.set_online(true);

    let probe: Arc<dyn ReachabilityProbe>;
    let interfaces: Arc<dyn InterfaceEnumerator>;
    if live {
        probe = Arc::new(HttpReachabilityProbe::with_defaults()?);
        interfaces = Arc::new(ProcfsInterfaceEnumerator::new());
    } else {
        probe = network.clone();
        interfaces = network.clone();
    }

    println!("1. Creating bridge adapter ({} mode)...", if live { "live" } else { "simulated" });
    let adapter = Arc::new(BridgeAdapter::from_config(probe, interfaces, &config)?);
    let bridge = Arc::new(LocalBridge::new(adapter.clone()));

    println!("2. Attaching façade, waiting for host readiness...");
    let facade = ConnectionFacade::new(bridge, Arc::new(PrintingEvents), config.facade.clone());
    let host_ready = ReadinessSignal::new(HOST_READY);
    let attached = facade.attach(host_ready.clone());

    host_ready.fire();
    attached.await?;
    facade.connection_ready().wait().await;
    println!("3. Connection ready: type = {}, online = {}\n", facade.connection_type(), facade.is_online());

    if !live {
        println!("4. Short outage (shorter than the debounce window)...");
        network.set_online(false);
        adapter.driver().detect_once().await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        network.set_online(true);
        adapter.driver().detect_once().await;
        tokio::time::sleep(Duration::from_millis(800)).await;

        println!("5. Long outage...");
        network.set_online(false);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        println!("   type = {}, online = {}", facade.connection_type(), facade.is_online());

        println!("6. Back online...");
        network.set_online(true);
        tokio::time::sleep(Duration::from_millis(1500)).await;
    } else {
        println!("4. Watching live connectivity for 5 seconds...");
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    info!("Final state: {:?}", adapter.current_state());
    adapter.shutdown().await;

    println!("\n=== Embedding Successful ===");
    Ok(())
}
