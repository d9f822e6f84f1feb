//! Startup and shutdown of the phone UI shim.
//!
//! Startup runs in a fixed order and stops at the first fatal error:
//!
//! 1. validate the configuration
//! 2. install logging from the configuration
//! 3. load the backend of every capability
//! 4. run every backend initializer with the process arguments
//! 5. open the service connection
//!
//! ```rust,ignore
//! use phoneui_runtime::PhoneUiRuntime;
//!
//! let runtime = PhoneUiRuntime::builder()
//!     .config_file("/etc/phoneui/phoneui.toml")
//!     .args(std::env::args())
//!     .start(bus)?;
//!
//! runtime.gui().dialer_show()?;
//! runtime.run().await;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::Notify;
use tracing::{info, warn};

use phoneui_core::{Bus, Connection};
use phoneui_gui::{BackendLoader, CapabilityRegistry, ExitNotify, LinkedLoader, PhoneGui};
use phoneui_utils::PhoneUtils;

use crate::config::{ConfigLoader, PhoneUiConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// A started phone UI: loaded backends plus a ready service connection.
pub struct PhoneUiRuntime {
    config: PhoneUiConfig,
    gui: PhoneGui,
    connection: Connection,
    utils: PhoneUtils,
    exit: Arc<Notify>,
}

impl PhoneUiRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Starts from an already loaded configuration.
    ///
    /// # Errors
    /// Fails on invalid configuration, on any backend that cannot be
    /// loaded, or if the connection cannot be opened. Nothing is left
    /// running on failure.
    pub fn start(
        config: PhoneUiConfig,
        bus: Arc<dyn Bus>,
        loader: &dyn BackendLoader,
        args: &[String],
    ) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let registry = CapabilityRegistry::new(config.service.missing_operation);
        registry.load_all(&config.backends, loader)?;
        let gui = PhoneGui::new(Arc::new(registry));

        let exit = Arc::new(Notify::new());
        let notify = exit.clone();
        let exit_notify: ExitNotify = Arc::new(move || notify.notify_one());
        gui.init(args, exit_notify);

        let connection = Connection::with_call_timeout(bus, config.service.call_timeout());
        connection.open()?;
        let utils = PhoneUtils::new(connection.clone(), config.service.log_sent_messages);

        info!(
            call_timeout_ms = config.service.call_timeout_ms,
            missing_operation = ?config.service.missing_operation,
            log_sent_messages = config.service.log_sent_messages,
            "Phone UI runtime started"
        );

        Ok(Self {
            config,
            gui,
            connection,
            utils,
            exit,
        })
    }

    pub fn config(&self) -> &PhoneUiConfig {
        &self.config
    }

    /// UI operations dispatched to the backends.
    pub fn gui(&self) -> &PhoneGui {
        &self.gui
    }

    /// Service operations over the bus.
    pub fn utils(&self) -> &PhoneUtils {
        &self.utils
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Asks [`run`](Self::run) to return, as a backend does through its
    /// exit notification.
    pub fn request_exit(&self) {
        self.exit.notify_one();
    }

    /// Closes the connection. Calls issued afterwards fail with
    /// `NotConnected`. A paged query in flight stops at its next step and
    /// still disposes its cursor.
    pub fn shutdown(&self) {
        self.connection.close();
        info!("Phone UI runtime stopped");
    }

    /// Runs until Ctrl+C, SIGTERM or an exit request, then shuts down.
    pub async fn run(&self) {
        info!("Phone UI runtime is running. Press Ctrl+C to stop.");
        self.wait_for_shutdown().await;
        self.shutdown();
    }

    /// Runs until `shutdown` resolves or an exit is requested.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => {}
            _ = self.exit.notified() => info!("Exit requested, shutting down"),
        }
        self.shutdown();
    }

    async fn wait_for_shutdown(&self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to register SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
            _ = terminate => info!("Received SIGTERM, shutting down"),
            _ = self.exit.notified() => info!("Exit requested, shutting down"),
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads the configuration, then starts a [`PhoneUiRuntime`].
///
/// Backends come from the `#[backend]` table unless another loader is set.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    backend_loader: Box<dyn BackendLoader>,
    args: Vec<String>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            backend_loader: Box::new(LinkedLoader::new()),
            args: Vec::new(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: PhoneUiConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    #[cfg(feature = "toml-config")]
    pub fn toml_str(mut self, content: &str) -> Self {
        self.config_loader = self.config_loader.toml_str(content);
        self
    }

    pub fn backend_loader(mut self, loader: impl BackendLoader + 'static) -> Self {
        self.backend_loader = Box::new(loader);
        self
    }

    /// Process arguments handed to every backend initializer.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Loads the configuration and starts the runtime over `bus`.
    pub fn start(self, bus: Arc<dyn Bus>) -> RuntimeResult<PhoneUiRuntime> {
        let config = self.config_loader.load()?;
        PhoneUiRuntime::start(config, bus, self.backend_loader.as_ref(), &self.args)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
