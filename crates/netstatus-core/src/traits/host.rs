// # Host Integration Traits
//
// The two seams between the façade and its host runtime:
//
// - `HostBridge`: marshals a call across the native/script boundary
// - `DocumentEvents`: fires application-wide document events

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::traits::callback::CallbackContext;

/// Service name the bridge adapter is registered under
pub const SERVICE_NAME: &str = "NetworkStatus";

/// Host bridge call surface
///
/// Mirrors the host's `exec(success, error, service, action, args)`.
/// `callback.progress` / `callback.success` may be invoked many times for
/// streaming actions and exactly once for terminal ones.
pub trait HostBridge: Send + Sync {
    fn exec(
        &self,
        service: &str,
        action: &str,
        args: Vec<Value>,
        callback: Arc<dyn CallbackContext>,
    );
}

/// Application-wide document events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentEvent {
    Online,
    Offline,
}

impl DocumentEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentEvent::Online => "online",
            DocumentEvent::Offline => "offline",
        }
    }
}

impl fmt::Display for DocumentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for document events
pub trait DocumentEvents: Send + Sync {
    fn fire(&self, event: DocumentEvent);
}
