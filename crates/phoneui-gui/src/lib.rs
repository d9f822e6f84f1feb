//! Capability registry for phone UI backends.
//!
//! # Overview
//!
//! The phone UI is split into eight [`Capability`] roles (dialer, messages,
//! contacts, ...). Each role is served by a backend library named in the
//! configuration. At startup the registry loads every backend through a
//! [`BackendLoader`]; afterwards [`PhoneGui`] forwards UI operations to the
//! entry points the backends export.
//!
//! Backends export any subset of the operations. Dispatching to an
//! operation a backend lacks is not an error by default: see
//! [`MissingOperationPolicy`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use phoneui_gui::*;
//!
//! let registry = CapabilityRegistry::new(MissingOperationPolicy::Warn);
//! registry.load_all(&config.backends, &LinkedLoader::new())?;
//!
//! let gui = PhoneGui::new(Arc::new(registry));
//! gui.incoming_call_show(1, 0, "+49123456")?;
//! ```

pub mod capability;
pub mod config;
pub mod entry;
pub mod error;
pub mod gui;
pub mod loader;
pub mod module;
pub mod registry;

pub use capability::Capability;
pub use config::{BackendConfig, BackendsConfig, MissingOperationPolicy};
pub use entry::{Args, EntryPoint, ExitNotify, Signature};
pub use error::{GuiError, GuiResult};
pub use gui::PhoneGui;
pub use loader::{BackendLoader, LinkedLoader, StaticLoader};
pub use module::{BACKEND_MODULES, BackendDecl, BackendModule, BackendModuleBuilder};
pub use registry::{BackendSlot, CapabilityRegistry, Dispatch, SlotState};

// Re-exported so `#[backend]` expansions resolve linkme through this crate.
pub use linkme;
