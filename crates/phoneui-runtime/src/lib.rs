//! Configuration, logging and startup for the phoneui shim.
//!
//! - [`config`]: layered [`PhoneUiConfig`] loading with figment
//! - [`logging`]: subscriber setup from the `[logging]` section
//! - [`runtime`]: [`PhoneUiRuntime`], which loads the backends, runs their
//!   initializers and opens the service connection
//!
//! ```ignore
//! use std::sync::Arc;
//! use phoneui_runtime::PhoneUiRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bus = Arc::new(my_bus::connect()?);
//!     let runtime = PhoneUiRuntime::builder()
//!         .args(std::env::args())
//!         .start(bus)?;
//!
//!     runtime.gui().dialer_show()?;
//!     runtime.run().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LogFormat, LogLevel, LogOutput, LoggingConfig,
    PhoneUiConfig, Profile, ServiceConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{PhoneUiRuntime, RuntimeBuilder};

// Re-export tracing for use by backend crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for backend crates.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
