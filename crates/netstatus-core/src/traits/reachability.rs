// # Reachability Probe Trait
//
// Defines the interface for answering "is there general internet connectivity".
//
// ## Implementations
//
// - HTTP-based: `netstatus-probe-http` crate
// - Future: platform reachability APIs (NWPathMonitor, NetworkManager)
//
// ## Usage
//
// ```rust,ignore
// use netstatus_core::ReachabilityProbe;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let probe = /* ReachabilityProbe implementation */;
//
//     if probe.is_online().await? {
//         println!("online");
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for reachability probe implementations
///
/// # Trust Level: Semi-Trusted
///
/// Probes are **observers**, not **decision-makers**.
///
/// ## Allowed Capabilities
/// - ✅ Perform network I/O to check connectivity
/// - ✅ Apply their own per-request timeouts
///
/// ## Forbidden Capabilities
/// - ❌ Cache results across calls (the driver decides when to ask again)
/// - ❌ Retry in a loop (the driver owns scheduling)
/// - ❌ Touch connection state directly (use `DetectionDriver`)
///
/// ## Failure Semantics
///
/// `Err` means "could not find out", which the driver treats exactly like
/// `Ok(false)`. Implementations should still prefer `Ok(false)` for the
/// ordinary "no route / request failed" case and reserve `Err` for
/// misconfiguration or internal failures worth logging.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Check whether the internet is reachable
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: Reachable
    /// - `Ok(false)`: Not reachable
    /// - `Err(Error)`: The check itself failed
    async fn is_online(&self) -> Result<bool, crate::Error>;

    /// Short name used in logs
    fn probe_name(&self) -> &'static str {
        "probe"
    }
}
