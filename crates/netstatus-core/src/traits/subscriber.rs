use crate::connection::ConnectionType;

/// Change listener registered with the [`SubscriberRegistry`](crate::SubscriberRegistry)
///
/// Receives only the connection type, not the full state. An `Err` return is
/// logged by the registry and never affects other subscribers.
pub trait Subscriber: Send + Sync {
    fn on_change(&self, connection_type: ConnectionType) -> Result<(), crate::Error>;
}

impl<F> Subscriber for F
where
    F: Fn(ConnectionType) -> Result<(), crate::Error> + Send + Sync,
{
    fn on_change(&self, connection_type: ConnectionType) -> Result<(), crate::Error> {
        self(connection_type)
    }
}
