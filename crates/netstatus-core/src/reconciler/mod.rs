//! State reconciler
//!
//! Holds the last known [`ConnectionState`] and decides whether a newly
//! observed candidate is a change worth announcing.
//!
//! ## Flow
//!
//! ```text
//! candidate ──► normalize ──► equal to last? ──yes──► no-op
//!                                  │
//!                                  no
//!                                  ▼
//!                           store as last ──► SubscriberRegistry::notify_all(type)
//!                                         └─► changes() stream
//! ```
//!
//! The comparison covers the full `{online, type}` pair.

use crate::connection::{ConnectionState, StateRecord};
use crate::registry::SubscriberRegistry;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info};

/// Last-state holder and change detector
///
/// One reconciler is one independent context: two reconcilers never share
/// state or subscribers unless they were built with the same registry.
pub struct StateReconciler {
    /// Most recent state, absent before the first reconciliation
    last: Mutex<Option<StateRecord>>,

    /// Change listeners
    subscribers: Arc<SubscriberRegistry>,

    /// Broadcast of the current state for stream consumers
    changes_tx: watch::Sender<Option<ConnectionState>>,
}

impl StateReconciler {
    /// Create a reconciler with its own, empty subscriber registry
    pub fn new() -> Self {
        Self::with_registry(Arc::new(SubscriberRegistry::new()))
    }

    /// Create a reconciler that notifies an existing registry
    pub fn with_registry(subscribers: Arc<SubscriberRegistry>) -> Self {
        let (changes_tx, _) = watch::channel(None);
        Self {
            last: Mutex::new(None),
            subscribers,
            changes_tx,
        }
    }

    /// The registry notified on change
    pub fn subscribers(&self) -> &Arc<SubscriberRegistry> {
        &self.subscribers
    }

    /// Most recent state, if any detection has completed
    pub fn last_state(&self) -> Option<ConnectionState> {
        self.last_record().map(|record| record.state)
    }

    /// Most recent state together with when it was recorded
    pub fn last_record(&self) -> Option<StateRecord> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Feed a candidate state
    ///
    /// Stores and announces the candidate if it differs from the last state.
    /// Never fails: subscriber failures are isolated by the registry, and
    /// anything else going wrong during notification is logged.
    ///
    /// # Returns
    ///
    /// The last state after the call
    pub fn reconcile(&self, candidate: ConnectionState) -> Option<ConnectionState> {
        // Re-normalize so a candidate built by any path honours the invariant
        let candidate = ConnectionState::new(candidate.is_online(), candidate.connection_type());

        let previous = {
            let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = last.as_ref().map(|record| record.state);

            if previous == Some(candidate) {
                debug!("Connection state unchanged: {}", candidate);
                return previous;
            }

            *last = Some(StateRecord::new(candidate));
            previous
        };

        match previous {
            Some(previous) => info!("Connection state changed: {} -> {}", previous, candidate),
            None => info!("Initial connection state: {}", candidate),
        }

        self.changes_tx.send_replace(Some(candidate));

        let subscribers = &self.subscribers;
        match catch_unwind(AssertUnwindSafe(|| {
            subscribers.notify_all(candidate.connection_type())
        })) {
            Ok(delivered) => {
                debug!(
                    "Notified {}/{} subscriber(s) of {}",
                    delivered,
                    subscribers.len(),
                    candidate.connection_type()
                );
            }
            Err(_) => {
                error!("Cannot publish connection type {}", candidate.connection_type());
            }
        }

        // A subscriber may have reconciled re-entrantly; report what is stored now
        self.last_state()
    }

    /// Stream of the current state followed by every change
    ///
    /// Yields nothing until the first reconciliation. Slow consumers observe
    /// only the latest state, never a backlog.
    pub fn changes(&self) -> Pin<Box<dyn Stream<Item = ConnectionState> + Send + 'static>> {
        let stream = WatchStream::new(self.changes_tx.subscribe()).filter_map(|state| state);
        Box::pin(stream)
    }
}

impl Default for StateReconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionType;

    #[test]
    fn test_first_state_is_always_a_change() {
        let reconciler = StateReconciler::new();
        assert_eq!(reconciler.last_state(), None);

        let state = ConnectionState::online(ConnectionType::Wifi);
        assert_eq!(reconciler.reconcile(state), Some(state));
        assert_eq!(reconciler.last_state(), Some(state));
        assert!(reconciler.last_record().is_some());
    }

    #[test]
    fn test_unchanged_state_keeps_record() {
        let reconciler = StateReconciler::new();
        let state = ConnectionState::online(ConnectionType::Ethernet);

        reconciler.reconcile(state);
        let first = reconciler.last_record().unwrap();

        reconciler.reconcile(state);
        let second = reconciler.last_record().unwrap();

        assert_eq!(first.recorded_at, second.recorded_at);
    }

    #[test]
    fn test_independent_reconcilers_do_not_share_state() {
        let a = StateReconciler::new();
        let b = StateReconciler::new();

        a.reconcile(ConnectionState::offline());
        assert_eq!(b.last_state(), None);
    }

    #[tokio::test]
    async fn test_changes_stream() {
        let reconciler = StateReconciler::new();
        let mut changes = reconciler.changes();

        reconciler.reconcile(ConnectionState::online(ConnectionType::Wifi));
        assert_eq!(
            changes.next().await,
            Some(ConnectionState::online(ConnectionType::Wifi))
        );

        reconciler.reconcile(ConnectionState::offline());
        assert_eq!(changes.next().await, Some(ConnectionState::offline()));
    }
}
