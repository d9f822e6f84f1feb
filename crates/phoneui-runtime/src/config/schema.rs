//! Configuration schema.
//!
//! ```toml
//! [backends.dialer]
//! library = "phoneui-efl"
//!
//! [service]
//! call_timeout_ms = 30000
//! log_sent_messages = true
//! missing_operation = "warn"
//!
//! [logging]
//! level = "debug"
//! format = "pretty"
//! output = "file"
//! file_path = "/var/log/phoneui.log"
//!
//! [logging.filters]
//! phoneui_utils = "trace"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use phoneui_core::DEFAULT_CALL_TIMEOUT;
use phoneui_gui::{BackendsConfig, MissingOperationPolicy};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneUiConfig {
    /// Backend library per capability.
    pub backends: BackendsConfig,
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
}

/// Settings of the service side: call bridge and registry dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upper bound for every remote call, in milliseconds.
    pub call_timeout_ms: u64,
    /// Keep a copy of every sent SMS in the message store.
    pub log_sent_messages: bool,
    /// What dispatching to an operation a backend lacks does.
    pub missing_operation: MissingOperationPolicy,
}

impl ServiceConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: DEFAULT_CALL_TIMEOUT.as_millis() as u64,
            log_sent_messages: true,
            missing_operation: MissingOperationPolicy::default(),
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Needs the `json-log` feature; falls back to `Full` without it.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Appends to `file_path`.
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Target file for [`LogOutput::File`].
    pub file_path: Option<PathBuf>,
    pub thread_ids: bool,
    /// Include source file and line.
    pub file_location: bool,
    /// Per-target levels, e.g. `phoneui_gui = "debug"`.
    pub filters: BTreeMap<String, LogLevel>,
}
