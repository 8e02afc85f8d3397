// # Readiness Signals
//
// Named, sticky, single-fire lifecycle signals. Waiting on a signal that has
// already fired returns immediately; firing it again is a no-op.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Host readiness signal the façade waits for before the first detection
pub const HOST_READY: &str = "onHostReady";

/// Signal the façade fires once connection info is available (or failed)
pub const CONNECTION_READY: &str = "onConnectionReady";

/// Sticky single-fire signal
#[derive(Debug, Clone)]
pub struct ReadinessSignal {
    name: &'static str,
    state: Arc<watch::Sender<bool>>,
}

impl ReadinessSignal {
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(false);
        Self {
            name,
            state: Arc::new(state),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_fired(&self) -> bool {
        *self.state.borrow()
    }

    /// Fire the signal
    ///
    /// # Returns
    ///
    /// `true` if this call fired it, `false` if it had already fired
    pub fn fire(&self) -> bool {
        let fired = self.state.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        });

        if fired {
            debug!("Signal {} fired", self.name);
        }
        fired
    }

    /// Wait until the signal has fired
    pub async fn wait(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_fires_once() {
        let signal = ReadinessSignal::new(CONNECTION_READY);
        assert!(!signal.is_fired());
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[test]
    fn test_wait_is_sticky() {
        let signal = ReadinessSignal::new(HOST_READY);
        let waiter = signal.clone();

        let mut wait = task::spawn(async move { waiter.wait().await });
        assert_pending!(wait.poll());

        signal.fire();
        assert!(wait.is_woken());
        assert_ready!(wait.poll());

        // Already fired: resolves on first poll
        let mut late = task::spawn(async move { signal.wait().await });
        assert_ready!(late.poll());
    }
}
