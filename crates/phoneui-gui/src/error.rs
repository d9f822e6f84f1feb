//! Registry error types.

use thiserror::Error;

use crate::capability::Capability;
use crate::entry::Signature;

/// Errors raised while loading backends or dispatching to them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuiError {
    /// No `library` is configured for the capability.
    #[error("no library configured for capability '{capability}'")]
    MissingLibrary {
        /// The capability without a library.
        capability: Capability,
    },

    /// The configured library is not known to the loader.
    #[error("loading '{library}' for capability '{capability}' failed: library not found")]
    LibraryNotFound {
        /// The capability being loaded.
        capability: Capability,
        /// The configured library name.
        library: String,
    },

    /// The capability slot has not been loaded.
    #[error("capability '{0}' is not loaded")]
    NotLoaded(Capability),

    /// The capability slot was already loaded.
    #[error("capability '{0}' is already loaded")]
    AlreadyLoaded(Capability),

    /// The backend does not export the operation.
    #[error("backend for '{capability}' has no operation '{operation}'")]
    MissingOperation {
        /// The capability that was dispatched to.
        capability: Capability,
        /// The operation name.
        operation: String,
    },

    /// The backend exports the operation with another signature.
    #[error("operation '{operation}' has signature {found}, expected {expected}")]
    SignatureMismatch {
        /// The operation name.
        operation: String,
        /// The signature the caller dispatched with.
        expected: Signature,
        /// The signature the backend exports.
        found: Signature,
    },
}

/// Result type for registry operations.
pub type GuiResult<T> = Result<T, GuiError>;
