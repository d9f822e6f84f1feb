//! Async access to the telephony, PIM and system services.
//!
//! # Layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bridge`] | [`CallBridge`]: one owned packet per call, callback delivered once |
//! | [`query`] | Paged PIM queries with cursor disposal |
//! | [`calls`] | Voice calls, USSD and the call log |
//! | [`contacts`] | Contacts, lookup by number and field definitions |
//! | [`messages`] | Stored messages |
//! | [`sms`] | SMS sending with an optional copy in the message store |
//! | [`system`] | Power, resources, idle state, packet data, offline mode |
//!
//! Domain clients return futures that can be awaited directly.
//! [`PhoneUtils`] wraps them all in the callback style used by UI code:
//!
//! ```rust,ignore
//! let utils = PhoneUtils::new(connection, true);
//! utils.dial("*100#", callback(|result, label: &'static str| {
//!     println!("{label}: {result:?}");
//! }), "balance")?;
//! ```

#[macro_use]
mod macros;

pub mod bridge;
pub mod calls;
mod client;
pub mod contacts;
pub mod messages;
pub mod query;
pub mod sms;
pub mod system;

pub use bridge::{
    BridgeStats, CallBridge, CallFuture, CallId, Callback, IntoCall, PacketState, SharedCallback, Submitted,
    SubmittedBatch, callback, shared_callback,
};
pub use calls::CallsClient;
pub use client::PhoneUtils;
pub use contacts::ContactsClient;
pub use messages::{MessageFields, MessagesClient};
pub use query::{Direction, PimDomain};
pub use sms::{SmsClient, SmsReceipt};
pub use system::{IdleState, PdpCredentials, ResourcePolicy, SystemClient};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use phoneui_core::{Connection, MockBus};

    /// An opened connection over `bus`.
    pub fn ready_connection(bus: Arc<MockBus>) -> Connection {
        let connection = Connection::new(bus);
        connection.open().unwrap();
        connection
    }

    /// Polls `condition` until it holds, failing the test after a second.
    pub async fn wait_until(condition: impl Fn() -> bool) {
        for _ in 0..500 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("condition not reached in time");
    }
}
