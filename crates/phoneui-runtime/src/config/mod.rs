//! Configuration loading and validation.
//!
//! One [`PhoneUiConfig`] carries the backend selection for the capability
//! registry, the service settings for the call bridge and the logging
//! setup. It is layered by [`ConfigLoader`] from defaults, files and
//! `PHONEUI_*` environment variables.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{LogFormat, LogLevel, LogOutput, LoggingConfig, PhoneUiConfig, ServiceConfig};
pub use validation::validate_config;
