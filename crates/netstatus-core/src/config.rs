//! Configuration types for the netstatus system
//!
//! This module defines all configuration structures used throughout the crate.
//! Every field has a default, so an empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main netstatus configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetStatusConfig {
    /// How detections are scheduled
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Reachability probe settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Script-side façade settings
    #[serde(default)]
    pub facade: FacadeConfig,
}

impl NetStatusConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.strategy.validate()?;
        self.probe.validate()?;
        Ok(())
    }
}

/// Detection scheduling strategy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Detect once, then again only when the navigator-online override changes
    #[default]
    EventDriven,

    /// Detect once, then on a fixed interval
    Polling {
        /// Poll interval in milliseconds
        #[serde(default = "default_poll_interval_ms")]
        interval_ms: u64,
    },
}

impl StrategyConfig {
    /// Polling with the default interval
    pub fn polling() -> Self {
        StrategyConfig::Polling {
            interval_ms: default_poll_interval_ms(),
        }
    }

    /// Validate the strategy configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StrategyConfig::Polling { interval_ms } if *interval_ms == 0 => {
                Err(crate::Error::config("Polling interval must be > 0"))
            }
            _ => Ok(()),
        }
    }

    /// Get the strategy name
    pub fn type_name(&self) -> &'static str {
        match self {
            StrategyConfig::EventDriven => "event_driven",
            StrategyConfig::Polling { .. } => "polling",
        }
    }
}

/// Reachability probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Upper bound for one probe call, in milliseconds
    ///
    /// A probe that does not answer in time counts as "offline".
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

impl ProbeConfig {
    /// Validate the probe configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.timeout_ms == 0 {
            return Err(crate::Error::config("Probe timeout must be > 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// Script-side façade configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacadeConfig {
    /// Delay before a "none" connection type is committed as an `offline` event
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Whether the host exposes its own online/offline signals
    ///
    /// When enabled, the façade forwards changes of those signals to the
    /// bridge's `setNavigatorOnlineStatus` action.
    #[serde(default)]
    pub host_online_signals: bool,

    /// The host's online signal at startup
    #[serde(default = "default_initial_navigator_online")]
    pub initial_navigator_online: bool,
}

impl FacadeConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            host_online_signals: false,
            initial_navigator_online: default_initial_navigator_online(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_initial_navigator_online() -> bool {
    true
}
