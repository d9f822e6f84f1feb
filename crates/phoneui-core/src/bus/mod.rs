//! The message-bus abstraction.
//!
//! # Overview
//!
//! A [`Bus`] carries one-shot method calls to remote objects and returns
//! their replies. It knows nothing about timeouts or connection state; both
//! are applied by [`Proxy`], which binds an [`ObjectRef`] to a
//! [`Connection`](crate::Connection).
//!
//! | Implementation | Strategy |
//! |----------------|----------|
//! | [`ChannelBus`] | JSON frames on an mpsc channel, replies matched back by serial. |
//! | `MockBus` (`test-util`) | Scripted in-process handler that records every call. |

mod channel;
#[cfg(any(test, feature = "test-util"))]
mod mock;

pub use channel::ChannelBus;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockBus, RecordedCall};

use std::fmt;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{trace, warn};

use crate::connection::Connection;
use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Bus trait
// =============================================================================

/// Transport for remote method calls.
#[async_trait]
pub trait Bus: Send + Sync {
    /// Invokes `method` on `target` and returns the reply payload.
    ///
    /// # Errors
    /// Returns [`ServiceError::Remote`] when the service answers with an
    /// error, or a transport error when the call never reaches it.
    async fn call(&self, target: &ObjectRef, method: &str, args: Vec<Value>) -> ServiceResult<Value>;

    /// Called when the owning connection is closed.
    ///
    /// The default implementation is a no-op.
    fn close(&self) {}
}

// =============================================================================
// ObjectRef
// =============================================================================

/// Address of a remote object: service name, object path and interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub service: String,
    pub path: String,
    pub interface: String,
}

impl ObjectRef {
    pub fn new(
        service: impl Into<String>,
        path: impl Into<String>,
        interface: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
            interface: interface.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.service, self.path, self.interface)
    }
}

// =============================================================================
// Proxy
// =============================================================================

/// A remote object bound to a connection.
///
/// Every call is bounded by the connection's call timeout. [`call`](Self::call)
/// also requires the connection to be ready; [`release`](Self::release)
/// does not, so server-side resources can be freed after a close.
#[derive(Clone)]
pub struct Proxy {
    connection: Connection,
    object: ObjectRef,
}

impl Proxy {
    pub(crate) fn new(connection: Connection, object: ObjectRef) -> Self {
        Self { connection, object }
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Invokes `method` and returns the raw reply.
    pub async fn call(&self, method: &str, args: Vec<Value>) -> ServiceResult<Value> {
        if !self.connection.is_ready() {
            return Err(ServiceError::NotConnected);
        }
        self.send(method, args).await
    }

    /// Invokes `method` whatever the connection state.
    ///
    /// Reserved for calls that free a server-side resource, such as
    /// disposing a query cursor while the connection shuts down.
    pub async fn release(&self, method: &str, args: Vec<Value>) -> ServiceResult<Value> {
        self.send(method, args).await
    }

    async fn send(&self, method: &str, args: Vec<Value>) -> ServiceResult<Value> {
        trace!(object = %self.object, method = %method, "Calling remote method");

        let limit = self.connection.call_timeout();
        match timeout(limit, self.connection.bus().call(&self.object, method, args)).await {
            Ok(reply) => reply,
            Err(_) => {
                warn!(
                    object = %self.object,
                    method = %method,
                    timeout_ms = limit.as_millis() as u64,
                    "Remote call timed out"
                );
                Err(ServiceError::Timeout)
            }
        }
    }

    /// Invokes `method` and decodes the reply into `T`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> ServiceResult<T> {
        let reply = self.call(method, args).await?;
        serde_json::from_value(reply).map_err(ServiceError::from)
    }

    /// Like [`call_as`](Self::call_as), but the returned future owns a clone
    /// of the proxy and can be spawned.
    pub fn request<T>(&self, method: &'static str, args: Vec<Value>) -> BoxFuture<'static, ServiceResult<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let proxy = self.clone();
        Box::pin(async move { proxy.call_as(method, args).await })
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("object", &self.object)
            .field("state", &self.connection.state())
            .finish()
    }
}
