//! Bridge adapter
//!
//! Exposes a [`DetectionDriver`] and its reconciler through the host's
//! action-dispatch surface: named actions, positional JSON arguments and a
//! tri-modal [`CallbackContext`].
//!
//! ## Actions
//!
//! | Action | Arguments | Callback |
//! |---|---|---|
//! | `getConnectionInfo` | `[]` | `progress(type)` now and on every change, never `success` |
//! | `setNavigatorOnlineStatus` | `[online: bool]` | `success()` synchronously |
//!
//! ## Dispatch Contract
//!
//! - Unknown action → `false`, no callback invoked, so the host can try another handler
//! - Known action → `true`, even if the action later fails
//! - A failure while invoking the action (error or panic) → `callback.error({message, cause})`

pub mod legacy;

use crate::config::{NetStatusConfig, StrategyConfig};
use crate::connection::{ConnectionState, ConnectionType};
use crate::engine::{DetectionDriver, DriverHandle};
use crate::error::{Error, Result};
use crate::reconciler::StateReconciler;
use crate::registry::SubscriberId;
use crate::traits::{
    CallbackContext, CallbackError, HostBridge, InterfaceEnumerator, ReachabilityProbe,
    SERVICE_NAME,
};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info};

pub use legacy::LegacyMethod;

/// Supported bridge actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Stream the connection type; streaming, never completes
    GetConnectionInfo,
    /// Apply the script environment's online signal
    SetNavigatorOnlineStatus,
}

impl Action {
    /// The fixed action table
    pub const ALL: [Action; 2] = [Action::GetConnectionInfo, Action::SetNavigatorOnlineStatus];

    /// Look up an action by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Action::ALL.into_iter().find(|action| action.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::GetConnectionInfo => "getConnectionInfo",
            Action::SetNavigatorOnlineStatus => "setNavigatorOnlineStatus",
        }
    }

    /// Whether the action keeps its callback open
    ///
    /// Streaming actions report through `progress` only and never call
    /// `success`.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Action::GetConnectionInfo)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Action-dispatch surface over a detection driver
///
/// ## Lifetime
///
/// Every `getConnectionInfo` call registers a subscriber that lives until
/// [`BridgeAdapter::shutdown`]. With the polling strategy, the first
/// `getConnectionInfo` call also starts the poll schedule, which runs until
/// shutdown as well.
pub struct BridgeAdapter {
    /// Detection driver (owns the reconciler)
    driver: Arc<DetectionDriver>,

    /// Scheduling strategy
    strategy: StrategyConfig,

    /// Running poll schedule
    schedule: Mutex<Option<DriverHandle>>,

    /// Subscribers registered by `getConnectionInfo`
    connections: Arc<Mutex<Vec<SubscriberId>>>,
}

impl BridgeAdapter {
    /// Create an adapter over an existing driver
    pub fn new(driver: Arc<DetectionDriver>, strategy: StrategyConfig) -> Self {
        Self {
            driver,
            strategy,
            schedule: Mutex::new(None),
            connections: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Build a reconciler, driver and adapter from collaborators and configuration
    pub fn from_config(
        probe: Arc<dyn ReachabilityProbe>,
        interfaces: Arc<dyn InterfaceEnumerator>,
        config: &NetStatusConfig,
    ) -> Result<Self> {
        config.validate()?;

        let reconciler = Arc::new(StateReconciler::new());
        let driver = Arc::new(DetectionDriver::new(
            probe,
            interfaces,
            reconciler,
            &config.probe,
        ));

        Ok(Self::new(driver, config.strategy.clone()))
    }

    pub fn driver(&self) -> &Arc<DetectionDriver> {
        &self.driver
    }

    /// Last reconciled state, if any
    pub fn current_state(&self) -> Option<ConnectionState> {
        self.driver.reconciler().last_state()
    }

    /// Number of open `getConnectionInfo` connections
    pub fn connection_count(&self) -> usize {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Dispatch a named action
    ///
    /// # Parameters
    ///
    /// - `action`: Action name (e.g., "getConnectionInfo")
    /// - `args`: Positional arguments
    /// - `callback`: Receiver for progress/success/error
    ///
    /// # Returns
    ///
    /// - `true`: The action is supported and was invoked
    /// - `false`: Unknown action; the callback was not touched
    pub fn dispatch(&self, action: &str, args: Vec<Value>, callback: Arc<dyn CallbackContext>) -> bool {
        let Some(action) = Action::from_name(action) else {
            debug!("Unknown action = {}", action);
            return false;
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.invoke(action, args, Arc::clone(&callback))
        }));

        let cause = match outcome {
            Ok(Ok(())) => return true,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic),
        };

        let message = format!("{} failed", action);
        error!("{}: {}", message, cause);
        callback.error(CallbackError::new(message, cause));

        true
    }

    fn invoke(&self, action: Action, args: Vec<Value>, callback: Arc<dyn CallbackContext>) -> Result<()> {
        match action {
            Action::GetConnectionInfo => self.get_connection_info(callback),
            Action::SetNavigatorOnlineStatus => self.set_navigator_online_status(&args, callback),
        }
    }

    /// Detect, report the type once, then report every change
    ///
    /// Never calls `callback.success`.
    fn get_connection_info(&self, callback: Arc<dyn CallbackContext>) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::bridge(format!("No runtime to detect connection on: {}", e)))?;

        if let StrategyConfig::Polling { .. } = self.strategy {
            let mut schedule = self.schedule.lock().unwrap_or_else(PoisonError::into_inner);
            if schedule.is_none() {
                *schedule = Some(self.driver.start(&self.strategy));
            }
        }

        let driver = Arc::clone(&self.driver);
        let connections = Arc::clone(&self.connections);

        runtime.spawn(async move {
            let (_, id) = driver
                .detect_and_subscribe(move |connection_type: ConnectionType| {
                    callback.progress(Value::from(connection_type.as_str()));
                })
                .await;

            connections
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(id);
        });

        Ok(())
    }

    fn set_navigator_online_status(&self, args: &[Value], callback: Arc<dyn CallbackContext>) -> Result<()> {
        let online = args.first().and_then(Value::as_bool).ok_or_else(|| {
            Error::invalid_argument(format!(
                "expected [online: bool], got {}",
                Value::Array(args.to_vec())
            ))
        })?;

        self.driver.set_navigator_online(online);
        callback.success(None);
        Ok(())
    }

    /// Promise-style entry points keyed by action name
    pub fn legacy_api(self: &Arc<Self>) -> std::collections::BTreeMap<&'static str, LegacyMethod> {
        Action::ALL
            .into_iter()
            .map(|action| (action.name(), LegacyMethod::new(Arc::clone(self), action)))
            .collect()
    }

    /// Stop the poll schedule and close every `getConnectionInfo` connection
    pub async fn shutdown(&self) {
        let schedule = self
            .schedule
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = schedule {
            handle.stop().await;
        }

        let ids: Vec<SubscriberId> = self
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let subscribers = self.driver.reconciler().subscribers();
        for id in &ids {
            subscribers.unregister(*id);
        }

        info!("Bridge adapter shut down ({} connection(s) closed)", ids.len());
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}

/// In-process host bridge
///
/// Routes `exec` calls for the `NetworkStatus` service to a [`BridgeAdapter`].
/// Unknown services and unhandled actions are reported through the error
/// callback, as the host would.
pub struct LocalBridge {
    adapter: Arc<BridgeAdapter>,
}

impl LocalBridge {
    pub fn new(adapter: Arc<BridgeAdapter>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &Arc<BridgeAdapter> {
        &self.adapter
    }
}

impl HostBridge for LocalBridge {
    fn exec(&self, service: &str, action: &str, args: Vec<Value>, callback: Arc<dyn CallbackContext>) {
        if service != SERVICE_NAME {
            callback.error(CallbackError::new(
                format!("{}.{} failed", service, action),
                Error::bridge(format!("Unknown service: {}", service)),
            ));
            return;
        }

        if !self.adapter.dispatch(action, args, Arc::clone(&callback)) {
            callback.error(CallbackError::new(
                format!("{}.{} failed", service, action),
                Error::bridge(format!("Action not handled: {}", action)),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_table() {
        assert_eq!(Action::from_name("getConnectionInfo"), Some(Action::GetConnectionInfo));
        assert_eq!(
            Action::from_name("setNavigatorOnlineStatus"),
            Some(Action::SetNavigatorOnlineStatus)
        );
        assert_eq!(Action::from_name("getinfo"), None);
        assert_eq!(Action::from_name(""), None);

        assert!(Action::GetConnectionInfo.is_streaming());
        assert!(!Action::SetNavigatorOnlineStatus.is_streaming());
    }

    #[test]
    fn test_panic_message() {
        let panic = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(panic), "boom");

        let panic = std::panic::catch_unwind(|| panic!("{} {}", "formatted", 1)).unwrap_err();
        assert_eq!(panic_message(panic), "formatted 1");
    }
}
