//! Backend modules and the link-time module table.
//!
//! # Overview
//!
//! A [`BackendModule`] is a library name plus a table of exported entry
//! points, keyed by operation name. The exported symbol of an operation is
//! `phonegui_backend_<operation>`; the module stores the bare operation name.
//!
//! Backends linked into the binary register themselves in
//! [`BACKEND_MODULES`] with `#[backend("library-name")]`:
//!
//! ```rust,ignore
//! use phoneui::prelude::*;
//!
//! #[backend("phoneui-efl")]
//! fn efl_backend() -> BackendModule {
//!     BackendModule::builder("phoneui-efl")
//!         .init(|args, exit| { /* ... */ })
//!         .call_status("incoming_call_show", |id, status, number| { /* ... */ })
//!         .build()
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use linkme::distributed_slice;
use tracing::debug;

use crate::entry::{EntryPoint, ExitNotify};

/// Prefix of every exported entry point symbol.
pub const SYMBOL_PREFIX: &str = "phonegui_backend_";

/// Operation name of the backend initializer.
pub const INIT: &str = "init";

/// Returns the exported symbol name of `operation`.
pub fn symbol_name(operation: &str) -> String {
    format!("{SYMBOL_PREFIX}{operation}")
}

// =============================================================================
// BackendModule
// =============================================================================

/// A loaded backend library.
pub struct BackendModule {
    library: String,
    entries: HashMap<String, EntryPoint>,
}

impl BackendModule {
    pub fn builder(library: impl Into<String>) -> BackendModuleBuilder {
        BackendModuleBuilder {
            module: BackendModule {
                library: library.into(),
                entries: HashMap::new(),
            },
        }
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    /// Looks up the entry point exported for `operation`.
    pub fn resolve(&self, operation: &str) -> Option<&EntryPoint> {
        let entry = self.entries.get(operation);
        if entry.is_none() {
            debug!(
                library = %self.library,
                symbol = %symbol_name(operation),
                "Symbol not found"
            );
        }
        entry
    }

    /// Names of all exported operations.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Debug for BackendModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendModule")
            .field("library", &self.library)
            .field("operations", &self.entries.len())
            .finish()
    }
}

/// Builder for [`BackendModule`].
pub struct BackendModuleBuilder {
    module: BackendModule,
}

impl BackendModuleBuilder {
    /// Exports `entry` under `operation`, replacing any previous export.
    pub fn entry(mut self, operation: impl Into<String>, entry: EntryPoint) -> Self {
        self.module.entries.insert(operation.into(), entry);
        self
    }

    /// Exports the backend initializer.
    pub fn init(self, f: impl Fn(&[String], ExitNotify) + Send + Sync + 'static) -> Self {
        self.entry(INIT, EntryPoint::init(f))
    }

    pub fn unit(self, operation: &str, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.entry(operation, EntryPoint::unit(f))
    }

    pub fn int(self, operation: &str, f: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.entry(operation, EntryPoint::int(f))
    }

    pub fn call_status(
        self,
        operation: &str,
        f: impl Fn(i32, i32, &str) + Send + Sync + 'static,
    ) -> Self {
        self.entry(operation, EntryPoint::call_status(f))
    }

    pub fn name_number(
        self,
        operation: &str,
        f: impl Fn(Option<&str>, Option<&str>) + Send + Sync + 'static,
    ) -> Self {
        self.entry(operation, EntryPoint::name_number(f))
    }

    pub fn mode_message(
        self,
        operation: &str,
        f: impl Fn(i32, &str) + Send + Sync + 'static,
    ) -> Self {
        self.entry(operation, EntryPoint::mode_message(f))
    }

    pub fn build(self) -> BackendModule {
        self.module
    }
}

// =============================================================================
// Module table (linkme distributed slice)
// =============================================================================

/// A backend module constructor registered at link time.
#[derive(Clone, Copy)]
pub struct BackendDecl {
    /// Library name the module is configured under.
    pub library: &'static str,
    /// Builds the module.
    pub open: fn() -> BackendModule,
}

/// Registry of backend modules linked into the binary.
/// Each `#[backend(...)]` function contributes one entry.
#[distributed_slice]
pub static BACKEND_MODULES: [BackendDecl];
