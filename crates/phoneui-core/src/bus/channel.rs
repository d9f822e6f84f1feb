//! Serial-matched JSON framing over an mpsc channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::{Bus, ObjectRef};
use crate::error::{ServiceError, ServiceResult};

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<ServiceResult<Value>>>>>;

/// [`Bus`] that writes JSON request frames to a channel.
///
/// Each [`call`](Bus::call):
/// 1. Takes the next serial number.
/// 2. Registers a one-shot channel keyed on that serial in the pending map.
/// 3. Sends `{"serial", "service", "path", "interface", "method", "args"}`.
/// 4. Awaits the one-shot receiver, which is resolved by
///    [`on_incoming_reply`](ChannelBus::on_incoming_reply) when a frame with
///    the same serial comes back.
///
/// A call whose future is dropped (e.g. by a timeout) removes its pending
/// entry, so late replies are logged and discarded.
pub struct ChannelBus {
    request_tx: mpsc::Sender<Vec<u8>>,
    pending: PendingMap,
    serial: AtomicU64,
}

impl ChannelBus {
    pub fn new(request_tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            request_tx,
            pending: Arc::new(Mutex::new(HashMap::new())),
            serial: AtomicU64::new(1),
        }
    }

    /// Creates a bus together with the receiving end of its request channel.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    /// Routes a reply frame to the waiting call.
    ///
    /// Returns `true` if the frame matched a pending call.
    pub fn on_incoming_reply(&self, frame: &Value) -> bool {
        let Some(serial) = frame.get("serial").and_then(Value::as_u64) else {
            return false;
        };
        let Some(tx) = self.pending.lock().remove(&serial) else {
            warn!(serial = %serial, "Received reply for unknown serial (timed out?)");
            return false;
        };
        let _ = tx.send(decode_reply(frame));
        true
    }

    /// Fails every pending call with `NotConnected`.
    pub fn on_disconnect(&self) {
        let mut pending = self.pending.lock();
        let count = pending.len();
        if count > 0 {
            debug!(count = count, "Clearing pending bus calls due to disconnect");
            pending.clear();
        }
    }

    /// Number of calls still awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

fn decode_reply(frame: &Value) -> ServiceResult<Value> {
    if let Some(error) = frame.get("error") {
        let name = error.get("name").and_then(Value::as_str).unwrap_or("unknown");
        let message = error.get("message").and_then(Value::as_str).unwrap_or("");
        return Err(ServiceError::remote(name, message));
    }
    Ok(frame.get("result").cloned().unwrap_or(Value::Null))
}

/// Removes a pending entry when the awaiting future goes away.
struct PendingGuard {
    pending: PendingMap,
    serial: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.serial);
    }
}

#[async_trait]
impl Bus for ChannelBus {
    async fn call(&self, target: &ObjectRef, method: &str, args: Vec<Value>) -> ServiceResult<Value> {
        let serial = self.serial.fetch_add(1, Ordering::SeqCst);

        // Register before sending so an early reply is never missed.
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(serial, tx);
        let _guard = PendingGuard {
            pending: self.pending.clone(),
            serial,
        };

        let request = json!({
            "serial": serial,
            "service": target.service,
            "path": target.path,
            "interface": target.interface,
            "method": method,
            "args": args,
        });

        debug!(serial = %serial, target = %target, method = %method, "Sending bus request");

        let frame = serde_json::to_vec(&request)?;
        self.request_tx
            .send(frame)
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        rx.await.unwrap_or(Err(ServiceError::NotConnected))
    }

    fn close(&self) {
        self.on_disconnect();
    }
}
