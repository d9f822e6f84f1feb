//! Core types for phoneui: the message-bus abstraction, the connection
//! context, PIM records and query descriptors, and the shared error type.
//!
//! # Layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bus`] | [`Bus`] trait, [`ObjectRef`], [`Proxy`] and the [`ChannelBus`] transport |
//! | [`connection`] | [`Connection`] with its `Uninitialized → Ready → Closed` lifecycle |
//! | [`record`] | PIM records, display names and contact ordering |
//! | [`descriptor`] | Query descriptors with reserved control keys |
//! | [`names`] | Well-known service names, paths and interfaces |
//! | [`error`] | [`ServiceError`] |
//!
//! The `test-util` feature exposes `MockBus`, a scripted bus that records
//! every call.

pub mod bus;
pub mod connection;
pub mod descriptor;
pub mod error;
pub mod names;
pub mod record;

pub use bus::{Bus, ChannelBus, ObjectRef, Proxy};
#[cfg(any(test, feature = "test-util"))]
pub use bus::{MockBus, RecordedCall};
pub use connection::{Connection, ConnectionState, DEFAULT_CALL_TIMEOUT};
pub use descriptor::{QueryDescriptor, QueryOptions};
pub use error::{ServiceError, ServiceResult};
pub use record::Record;

// Re-exported so downstream crates build field values without naming
// serde_json themselves.
pub use serde_json::{Value, json};
