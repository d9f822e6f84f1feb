//! The shared connection context.
//!
//! A [`Connection`] owns the bus handle, the lifecycle state and the call
//! timeout. It is created once at startup and cloned into every component
//! that issues remote calls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::bus::{Bus, ObjectRef, Proxy};
use crate::error::{ServiceError, ServiceResult};

/// Default bound on a single remote call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifecycle of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created but not yet opened; calls fail with `NotConnected`.
    Uninitialized,
    /// Calls are forwarded to the bus.
    Ready,
    /// Closed for good.
    Closed,
}

struct ConnectionInner {
    bus: Arc<dyn Bus>,
    state: RwLock<ConnectionState>,
    call_timeout: Duration,
}

/// Cheaply clonable handle to the bus connection.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl Connection {
    /// Creates an uninitialized connection with the default call timeout.
    pub fn new(bus: Arc<dyn Bus>) -> Self {
        Self::with_call_timeout(bus, DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_call_timeout(bus: Arc<dyn Bus>, call_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                bus,
                state: RwLock::new(ConnectionState::Uninitialized),
                call_timeout,
            }),
        }
    }

    /// Moves the connection to `Ready`.
    ///
    /// Opening a ready connection is a no-op.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotConnected`] if the connection was closed.
    pub fn open(&self) -> ServiceResult<()> {
        let mut state = self.inner.state.write();
        match *state {
            ConnectionState::Uninitialized => {
                *state = ConnectionState::Ready;
                info!("Bus connection ready");
                Ok(())
            }
            ConnectionState::Ready => Ok(()),
            ConnectionState::Closed => Err(ServiceError::NotConnected),
        }
    }

    /// Moves the connection to `Closed` and notifies the bus.
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.inner.state.write(), ConnectionState::Closed);
        if previous != ConnectionState::Closed {
            debug!(?previous, "Closing bus connection");
            self.inner.bus.close();
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.read()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    pub fn call_timeout(&self) -> Duration {
        self.inner.call_timeout
    }

    pub fn bus(&self) -> &Arc<dyn Bus> {
        &self.inner.bus
    }

    /// Binds `object` to this connection.
    pub fn proxy(&self, object: ObjectRef) -> Proxy {
        Proxy::new(self.clone(), object)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state())
            .field("call_timeout", &self.inner.call_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MockBus;
    use crate::names;
    use serde_json::{Value, json};

    fn connection() -> (Arc<MockBus>, Connection) {
        let bus = Arc::new(MockBus::new(|_, _, _| Ok(json!("pong"))));
        let connection = Connection::new(bus.clone());
        (bus, connection)
    }

    #[test]
    fn test_lifecycle_transitions() {
        let (_bus, connection) = connection();
        assert_eq!(connection.state(), ConnectionState::Uninitialized);

        connection.open().unwrap();
        assert_eq!(connection.state(), ConnectionState::Ready);
        connection.open().unwrap();

        connection.close();
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert_eq!(connection.open(), Err(ServiceError::NotConnected));
    }

    #[tokio::test]
    async fn test_call_before_open_is_rejected() {
        let (bus, connection) = connection();
        let proxy = connection.proxy(names::usage());

        let result = proxy.call("Suspend", vec![]).await;
        assert_eq!(result, Err(ServiceError::NotConnected));
        assert!(bus.calls().is_empty());
    }

    #[tokio::test]
    async fn test_call_after_close_is_rejected() {
        let (bus, connection) = connection();
        connection.open().unwrap();
        let proxy = connection.proxy(names::usage());

        assert_eq!(proxy.call("Suspend", vec![]).await, Ok(json!("pong")));
        connection.close();
        assert_eq!(
            proxy.call("Suspend", vec![]).await,
            Err(ServiceError::NotConnected)
        );
        assert_eq!(bus.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_release_reaches_bus_after_close() {
        let (bus, connection) = connection();
        connection.open().unwrap();
        let proxy = connection.proxy(names::pim_object("/org/freesmartphone/PIM/Contacts/Queries/1", "q"));
        connection.close();

        assert_eq!(proxy.release("Dispose", vec![]).await, Ok(json!("pong")));
        assert_eq!(bus.count("Dispose"), 1);
    }

    #[tokio::test]
    async fn test_call_times_out() {
        let bus = Arc::new(
            MockBus::new(|_, _, _| Ok(Value::Null)).with_latency(Duration::from_millis(200)),
        );
        let connection = Connection::with_call_timeout(bus, Duration::from_millis(10));
        connection.open().unwrap();

        let result = connection.proxy(names::usage()).call("Suspend", vec![]).await;
        assert_eq!(result, Err(ServiceError::Timeout));
    }

    #[tokio::test]
    async fn test_call_as_decodes() {
        let bus = Arc::new(MockBus::new(|_, _, _| Ok(json!(["apn", "user", "pw"]))));
        let connection = Connection::new(bus);
        connection.open().unwrap();

        let proxy = connection.proxy(names::gsm_device(names::interface::GSM_PDP));
        let creds: (String, String, String) = proxy.call_as("GetCredentials", vec![]).await.unwrap();
        assert_eq!(creds.0, "apn");

        let bad: ServiceResult<i32> = proxy.call_as("GetCredentials", vec![]).await;
        assert!(matches!(bad, Err(ServiceError::Decode(_))));
    }
}
