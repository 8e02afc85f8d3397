// # Connection Type Taxonomy
//
// The closed set of connection labels exposed as `navigator.connection.type`,
// the state value the reconciler compares, and the mapping from raw interface
// categories reported by enumerators.
//
// The string literals must stay in sync with what script code compares
// against (`"none"`, `"wifi"`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw interface category for wired links
pub const RAW_WIRED: &str = "Wired";

/// Raw interface category for wireless links
pub const RAW_WIRELESS: &str = "Wireless";

/// Connection type as seen by script code
///
/// Only `Unknown`, `Ethernet`, `Wifi` and `None` are produced by detection.
/// The cellular variants are reserved for native backends that report them
/// and are carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionType {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "ethernet")]
    Ethernet,
    #[serde(rename = "wifi")]
    Wifi,
    #[serde(rename = "2g")]
    Cell2G,
    #[serde(rename = "3g")]
    Cell3G,
    #[serde(rename = "4g")]
    Cell4G,
    #[serde(rename = "cellular")]
    Cell,
    #[serde(rename = "none")]
    None,
}

impl ConnectionType {
    /// Every connection type, in declaration order
    pub const ALL: [ConnectionType; 8] = [
        ConnectionType::Unknown,
        ConnectionType::Ethernet,
        ConnectionType::Wifi,
        ConnectionType::Cell2G,
        ConnectionType::Cell3G,
        ConnectionType::Cell4G,
        ConnectionType::Cell,
        ConnectionType::None,
    ];

    /// The literal exposed to script code
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Unknown => "unknown",
            ConnectionType::Ethernet => "ethernet",
            ConnectionType::Wifi => "wifi",
            ConnectionType::Cell2G => "2g",
            ConnectionType::Cell3G => "3g",
            ConnectionType::Cell4G => "4g",
            ConnectionType::Cell => "cellular",
            ConnectionType::None => "none",
        }
    }

    /// Whether this type means "no connection"
    pub fn is_none(&self) -> bool {
        matches!(self, ConnectionType::None)
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConnectionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::Error::invalid_argument(format!("Unknown connection type: {}", s)))
    }
}

/// Map a raw interface category to a connection type
///
/// Total: anything other than `"Wired"` or `"Wireless"`, including an absent
/// category, is `Unknown`.
pub fn classify(raw: Option<&str>) -> ConnectionType {
    match raw {
        Some(RAW_WIRED) => ConnectionType::Ethernet,
        Some(RAW_WIRELESS) => ConnectionType::Wifi,
        _ => ConnectionType::Unknown,
    }
}

/// Observed connection state
///
/// Construction enforces `online == false ⇒ connection_type == None`; the
/// fields are private so no other combination can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionState {
    online: bool,
    #[serde(rename = "type")]
    connection_type: ConnectionType,
}

impl ConnectionState {
    /// Create a state, normalizing the type to `None` when offline
    pub fn new(online: bool, connection_type: ConnectionType) -> Self {
        let connection_type = if online {
            connection_type
        } else {
            ConnectionType::None
        };

        Self {
            online,
            connection_type,
        }
    }

    /// `{online: false, type: none}`
    pub fn offline() -> Self {
        Self::new(false, ConnectionType::None)
    }

    /// `{online: true, type: connection_type}`
    pub fn online(connection_type: ConnectionType) -> Self {
        Self::new(true, connection_type)
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }
}

impl<'de> Deserialize<'de> for ConnectionState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            online: bool,
            #[serde(rename = "type")]
            connection_type: ConnectionType,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(ConnectionState::new(raw.online, raw.connection_type))
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{online: {}, type: {}}}",
            self.online, self.connection_type
        )
    }
}

/// The last recorded state and when it was recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub state: ConnectionState,
    pub recorded_at: DateTime<Utc>,
}

impl StateRecord {
    /// Create a record stamped with the current time
    pub fn new(state: ConnectionState) -> Self {
        Self {
            state,
            recorded_at: Utc::now(),
        }
    }
}
