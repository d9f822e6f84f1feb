//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use phoneui_core::ServiceError;
use phoneui_gui::GuiError;

/// Errors that abort startup.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A backend could not be loaded.
    #[error("Backend loading failed: {0}")]
    Backend(#[from] GuiError),

    /// The service connection could not be opened.
    #[error("Service connection failed: {0}")]
    Connection(#[from] ServiceError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
