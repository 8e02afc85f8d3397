// # Legacy Promise-Style Surface
//
// Older hosts call actions directly with only their arguments and expect a
// single future back. This adapts such a call to the tri-modal callback:
//
// - `progress` → logged as unsupported and ignored
// - `success`  → resolves the future
// - `error`    → rejects the future
//
// Streaming actions never call `success`, so their future stays pending for
// as long as the connection stays open. If an action drops its callback
// without completing, the future resolves to an error.

use super::{Action, BridgeAdapter};
use crate::traits::{CallbackContext, CallbackError};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tracing::warn;

type Completion = std::result::Result<Option<Value>, CallbackError>;

/// A single legacy entry point
#[derive(Clone)]
pub struct LegacyMethod {
    adapter: Arc<BridgeAdapter>,
    action: Action,
}

impl LegacyMethod {
    pub(crate) fn new(adapter: Arc<BridgeAdapter>, action: Action) -> Self {
        Self { adapter, action }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Invoke the action and wait for its terminal outcome
    pub async fn call(&self, args: Vec<Value>) -> Completion {
        let (tx, rx) = oneshot::channel();
        let callback = Arc::new(PromiseCallback {
            action: self.action,
            completion: Mutex::new(Some(tx)),
        });

        // Always handled: the action comes from the fixed table
        self.adapter.dispatch(self.action.name(), args, callback);

        rx.await.unwrap_or_else(|_| {
            Err(CallbackError::new(
                format!("{} failed", self.action),
                "callback dropped without completing",
            ))
        })
    }
}

/// Callback that settles a oneshot on the first terminal call
struct PromiseCallback {
    action: Action,
    completion: Mutex<Option<oneshot::Sender<Completion>>>,
}

impl PromiseCallback {
    fn settle(&self, outcome: Completion) {
        let sender = self
            .completion
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(sender) = sender {
            let _ = sender.send(outcome);
        }
    }
}

impl CallbackContext for PromiseCallback {
    fn progress(&self, data: Value) {
        warn!(
            "{}: ignoring progress event as not supported in legacy API: {}",
            self.action, data
        );
    }

    fn success(&self, data: Option<Value>) {
        self.settle(Ok(data));
    }

    fn error(&self, error: CallbackError) {
        self.settle(Err(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_terminal_call_wins() {
        let (tx, mut rx) = oneshot::channel();
        let callback = PromiseCallback {
            action: Action::SetNavigatorOnlineStatus,
            completion: Mutex::new(Some(tx)),
        };

        callback.progress(Value::from("wifi"));
        callback.success(Some(Value::from(true)));
        callback.error(CallbackError::new("late", "ignored"));

        assert_eq!(rx.try_recv().unwrap(), Ok(Some(Value::from(true))));
    }

    #[test]
    fn test_dropped_callback_rejects() {
        let (tx, rx) = oneshot::channel::<Completion>();
        drop(tx);
        assert!(tokio_test::block_on(rx).is_err());
    }
}
