//! Core traits for the netstatus system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ReachabilityProbe`]: Is the internet reachable?
//! - [`InterfaceEnumerator`]: Which interface is active?
//! - [`Subscriber`]: Listener for connection type changes
//! - [`CallbackContext`]: Tri-modal callback of a bridge action
//! - [`HostBridge`] / [`DocumentEvents`]: Host runtime seams used by the façade

pub mod reachability;
pub mod interface;
pub mod subscriber;
pub mod callback;
pub mod host;

pub use reachability::ReachabilityProbe;
pub use interface::{ActiveInterface, InterfaceEnumerator};
pub use subscriber::Subscriber;
pub use callback::{CallbackContext, CallbackError};
pub use host::{DocumentEvent, DocumentEvents, HostBridge, SERVICE_NAME};
