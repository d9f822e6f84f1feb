//! Procedural macros for phoneui.
//!
//! This crate provides:
//!
//! - `#[backend("library")]` - Registers a backend module constructor in the
//!   link-time module table
//!
//! # Backend Registration
//!
//! ```rust,ignore
//! use phoneui::prelude::*;
//!
//! #[backend("phoneui-efl")]
//! fn efl_backend() -> BackendModule {
//!     BackendModule::builder("phoneui-efl")
//!         .unit("dialer_show", || show_dialer())
//!         .build()
//! }
//! ```
//!
//! Any capability configured with `library = "phoneui-efl"` is then served
//! by `efl_backend` when the registry loads through `LinkedLoader`.

mod backend;

use proc_macro::TokenStream;

/// Registers a backend module constructor under a library name.
///
/// The decorated function must have the signature `fn() -> BackendModule`.
/// Both `#[backend("name")]` and `#[backend(library = "name")]` are accepted.
///
/// The expansion refers to `::phoneui_gui`, so the calling crate must depend
/// on `phoneui-gui` directly.
#[proc_macro_attribute]
pub fn backend(attr: TokenStream, item: TokenStream) -> TokenStream {
    backend::backend(attr, item)
}
