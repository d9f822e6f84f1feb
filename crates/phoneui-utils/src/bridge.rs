//! The async call bridge.
//!
//! # Overview
//!
//! Every public operation turns into one [`CallPacket`] that owns the
//! caller's callback and user data for exactly as long as the remote call
//! is in flight:
//!
//! ```text
//! Created ──issue──▶ Issued ──reply──▶ Completed ──drop──▶ Retired
//! ```
//!
//! The packet is moved into the spawned task. Whatever happens to the call
//! (success, remote error, undecodable reply, timeout, closed connection)
//! the task completes the packet once and drops it, and dropping is the
//! only place a packet is retired. [`BridgeStats`] counts both ends so the
//! invariant is observable.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use phoneui_core::{Connection, ObjectRef, Proxy, ServiceError, ServiceResult, Value};

/// Identifier of an issued call, unique per bridge.
pub type CallId = u64;

/// One-shot completion callback: result first, then the caller's user data.
pub type Callback<T, U> = Box<dyn FnOnce(ServiceResult<T>, U) + Send>;

/// Completion callback for operations that complete several times.
pub type SharedCallback<T, U> = Arc<dyn Fn(ServiceResult<T>, U) + Send + Sync>;

/// Synchronous outcome of submitting an operation.
pub type Submitted = Result<CallId, ServiceError>;

/// Synchronous outcome of submitting a fan-out operation, one id per packet.
pub type SubmittedBatch = Result<Vec<CallId>, ServiceError>;

/// A remote call ready to be issued.
pub type CallFuture<T> = BoxFuture<'static, ServiceResult<T>>;

/// Conversion of a client method's return value into an issuable call.
///
/// Client methods that validate their arguments return
/// `ServiceResult<CallFuture<T>>`; the error is surfaced synchronously and
/// no call is issued.
pub trait IntoCall<T> {
    fn into_call(self) -> ServiceResult<CallFuture<T>>;
}

impl<T> IntoCall<T> for CallFuture<T> {
    fn into_call(self) -> ServiceResult<CallFuture<T>> {
        Ok(self)
    }
}

impl<T> IntoCall<T> for ServiceResult<CallFuture<T>> {
    fn into_call(self) -> ServiceResult<CallFuture<T>> {
        self
    }
}

/// Boxes a closure as a [`Callback`].
pub fn callback<T, U>(f: impl FnOnce(ServiceResult<T>, U) + Send + 'static) -> Option<Callback<T, U>> {
    Some(Box::new(f))
}

/// Wraps a closure as a [`SharedCallback`].
pub fn shared_callback<T, U>(
    f: impl Fn(ServiceResult<T>, U) + Send + Sync + 'static,
) -> Option<SharedCallback<T, U>> {
    Some(Arc::new(f))
}

// =============================================================================
// Stats
// =============================================================================

/// Packet counters of a bridge.
#[derive(Debug, Default)]
pub struct BridgeStats {
    issued: AtomicU64,
    retired: AtomicU64,
}

impl BridgeStats {
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn retired(&self) -> u64 {
        self.retired.load(Ordering::SeqCst)
    }

    /// Packets issued but not yet retired.
    pub fn in_flight(&self) -> u64 {
        self.issued().saturating_sub(self.retired())
    }
}

// =============================================================================
// CallPacket
// =============================================================================

/// Lifecycle of a [`CallPacket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketState {
    Created,
    Issued,
    Completed,
    Retired,
}

/// Context of one in-flight call.
struct CallPacket<T, U> {
    id: CallId,
    operation: &'static str,
    callback: Option<Callback<T, U>>,
    userdata: Option<U>,
    state: PacketState,
    stats: Arc<BridgeStats>,
}

impl<T, U> CallPacket<T, U> {
    fn new(
        id: CallId,
        operation: &'static str,
        callback: Option<Callback<T, U>>,
        userdata: U,
        stats: Arc<BridgeStats>,
    ) -> Self {
        Self {
            id,
            operation,
            callback,
            userdata: Some(userdata),
            state: PacketState::Created,
            stats,
        }
    }

    fn mark_issued(&mut self) {
        debug_assert_eq!(self.state, PacketState::Created);
        self.state = PacketState::Issued;
        self.stats.issued.fetch_add(1, Ordering::SeqCst);
    }

    /// Hands the result to the callback. The packet is retired when it goes
    /// out of scope at the end of this call.
    fn complete(mut self, result: ServiceResult<T>) {
        debug_assert_eq!(self.state, PacketState::Issued);
        self.state = PacketState::Completed;

        if let Err(err) = &result {
            debug!(id = self.id, operation = self.operation, error = %err, "Call failed");
        }

        if let (Some(callback), Some(userdata)) = (self.callback.take(), self.userdata.take()) {
            callback(result, userdata);
        }
    }
}

impl<T, U> Drop for CallPacket<T, U> {
    fn drop(&mut self) {
        if self.state == PacketState::Created {
            return;
        }
        self.state = PacketState::Retired;
        self.stats.retired.fetch_add(1, Ordering::SeqCst);
        trace!(id = self.id, operation = self.operation, "Call packet retired");
    }
}

// =============================================================================
// CallBridge
// =============================================================================

/// Issues remote calls and routes their results to callbacks.
#[derive(Clone)]
pub struct CallBridge {
    connection: Connection,
    next_id: Arc<AtomicU64>,
    stats: Arc<BridgeStats>,
}

impl CallBridge {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            next_id: Arc::new(AtomicU64::new(1)),
            stats: Arc::new(BridgeStats::default()),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    pub fn proxy(&self, object: ObjectRef) -> Proxy {
        self.connection.proxy(object)
    }

    /// Issues `call` on a new task and returns its id.
    ///
    /// `callback` receives the result and `userdata` exactly once; without
    /// a callback the result is only logged.
    ///
    /// # Errors
    /// Returns [`ServiceError::Transport`] without creating a packet when
    /// there is no async runtime to run the call on.
    pub fn issue<T, U, F>(
        &self,
        operation: &'static str,
        call: F,
        callback: Option<Callback<T, U>>,
        userdata: U,
    ) -> Submitted
    where
        F: Future<Output = ServiceResult<T>> + Send + 'static,
        T: Send + 'static,
        U: Send + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| ServiceError::Transport(format!("no async runtime: {e}")))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut packet = CallPacket::new(id, operation, callback, userdata, self.stats.clone());
        packet.mark_issued();

        trace!(id = id, operation = operation, "Issuing call");
        runtime.spawn(async move {
            let result = call.await;
            packet.complete(result);
        });

        Ok(id)
    }

    /// Issues `call` with nobody waiting for the result.
    pub fn fire_and_forget<T, F>(&self, operation: &'static str, call: F) -> Submitted
    where
        F: Future<Output = ServiceResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.issue::<T, (), F>(operation, call, None, ())
    }
}

// =============================================================================
// Client helpers
// =============================================================================

/// A call whose reply payload is ignored.
pub(crate) fn discard(proxy: Proxy, method: &'static str, args: Vec<Value>) -> CallFuture<()> {
    Box::pin(async move { proxy.call(method, args).await.map(drop) })
}

/// Rejects an empty string argument.
pub(crate) fn require(what: &str, value: &str) -> ServiceResult<()> {
    if value.is_empty() {
        return Err(ServiceError::invalid(format!("{what} must not be empty")));
    }
    Ok(())
}

impl fmt::Debug for CallBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallBridge")
            .field("connection", &self.connection)
            .field("stats", &self.stats)
            .finish()
    }
}
