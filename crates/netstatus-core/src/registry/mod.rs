//! Subscriber registry
//!
//! An ordered list of change listeners. The reconciler hands every real
//! change to [`SubscriberRegistry::notify_all`], which delivers it to each
//! subscriber in registration order.
//!
//! ## Usage
//!
//! ```rust
//! use netstatus_core::{ConnectionType, SubscriberRegistry};
//!
//! let registry = SubscriberRegistry::new();
//! let id = registry.register(|t: ConnectionType| {
//!     println!("connection type is now {}", t);
//!     Ok(())
//! });
//!
//! assert_eq!(registry.notify_all(ConnectionType::Wifi), 1);
//! assert!(registry.unregister(id));
//! ```
//!
//! ## Isolation
//!
//! A subscriber that returns `Err` or panics is logged and skipped; the
//! remaining subscribers are still notified and the subscriber stays
//! registered.

use crate::connection::ConnectionType;
use crate::traits::Subscriber;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error};

/// Handle returned by [`SubscriberRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Ordered registry of change subscribers
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock. Notification works on
/// a snapshot taken under the read lock and released before any subscriber
/// runs, so subscribers may register or unregister (themselves included)
/// while a notification is in flight.
#[derive(Default)]
pub struct SubscriberRegistry {
    entries: RwLock<Vec<(SubscriberId, Arc<dyn Subscriber>)>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a closure subscriber
    ///
    /// The subscriber receives every change reconciled after this call.
    pub fn register<F>(&self, subscriber: F) -> SubscriberId
    where
        F: Fn(ConnectionType) -> crate::Result<()> + Send + Sync + 'static,
    {
        self.register_arc(Arc::new(subscriber))
    }

    /// Append an already shared subscriber
    pub fn register_arc(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push((id, subscriber));
        debug!("Registered subscriber {:?} ({} total)", id, entries.len());
        id
    }

    /// Remove a subscriber
    ///
    /// # Returns
    ///
    /// `true` if the subscriber was registered, `false` otherwise
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        before != entries.len()
    }

    /// Number of registered subscribers
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a connection type to every subscriber, in registration order
    ///
    /// # Returns
    ///
    /// The number of subscribers that accepted the notification
    pub fn notify_all(&self, connection_type: ConnectionType) -> usize {
        let snapshot: Vec<(SubscriberId, Arc<dyn Subscriber>)> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut delivered = 0;
        for (id, subscriber) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| subscriber.on_change(connection_type))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    error!("Cannot notify subscriber {:?}: {}", id, e);
                }
                Err(_) => {
                    error!("Subscriber {:?} panicked while being notified", id);
                }
            }
        }

        delivered
    }
}
