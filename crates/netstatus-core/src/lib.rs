// # netstatus-core
//
// Core library for network connection-state detection and its
// `navigator.connection` bridge.
//
// ## Architecture Overview
//
// - **ReachabilityProbe**: Trait for asking whether the internet is reachable
// - **InterfaceEnumerator**: Trait for finding the active network interface
// - **DetectionDriver**: Turns probe and interface answers into a candidate state
// - **StateReconciler**: Keeps the last state and notifies only on real change
// - **SubscriberRegistry**: Ordered, panic-isolated change listeners
// - **BridgeAdapter**: Named-action dispatch surface for a host bridge
// - **ConnectionFacade**: Script-side object with debounced online/offline events
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Platform queries live behind traits
// 2. **Idempotency**: Unchanged states never reach subscribers
// 3. **Never Fails Outward**: Detection failures degrade to offline / unknown
// 4. **Library-First**: Every layer can be used without the ones above it

pub mod traits;
pub mod connection;
pub mod engine;
pub mod registry;
pub mod reconciler;
pub mod bridge;
pub mod facade;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{
    ActiveInterface, CallbackContext, CallbackError, DocumentEvent, DocumentEvents, HostBridge,
    InterfaceEnumerator, ReachabilityProbe, SERVICE_NAME, Subscriber,
};
pub use connection::{ConnectionState, ConnectionType, StateRecord, classify};
pub use engine::{DetectionDriver, DriverHandle};
pub use registry::{SubscriberId, SubscriberRegistry};
pub use reconciler::StateReconciler;
pub use bridge::{Action, BridgeAdapter, LegacyMethod, LocalBridge};
pub use facade::{CONNECTION_READY, ConnectionFacade, HOST_READY, ReadinessSignal};
pub use config::{FacadeConfig, NetStatusConfig, ProbeConfig, StrategyConfig};
pub use error::{Error, Result};
