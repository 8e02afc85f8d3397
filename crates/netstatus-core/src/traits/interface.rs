// # Interface Enumerator Trait
//
// Defines the interface for querying the presently active network interface.
//
// ## Implementations
//
// - procfs/sysfs (Linux): `netstatus-iface-procfs` crate

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The active network interface, as reported by an enumerator
///
/// `kind` is the raw category string (`"Wired"`, `"Wireless"`, or anything the
/// platform reports). It is classified by [`crate::classify`]; unrecognized or
/// absent categories become `unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActiveInterface {
    /// Interface name (e.g., "eth0", "wlan0")
    pub name: Option<String>,
    /// Raw interface category
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ActiveInterface {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(kind.into()),
        }
    }
}

/// Trait for active-interface enumerators
///
/// Only consulted after the reachability probe answered "online".
///
/// # Returns
///
/// - `Ok(Some(ActiveInterface))`: An active interface was found
/// - `Ok(None)`: No active interface could be identified
/// - `Err(Error)`: Enumeration failed
///
/// The driver maps both `Ok(None)` and `Err` to `{online: true, type: unknown}`.
#[async_trait]
pub trait InterfaceEnumerator: Send + Sync {
    async fn active_interface(&self) -> Result<Option<ActiveInterface>, crate::Error>;
}
