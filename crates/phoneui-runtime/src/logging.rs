//! Subscriber setup from the `[logging]` section.
//!
//! ```rust,ignore
//! use phoneui_runtime::logging::LoggingBuilder;
//! use phoneui_runtime::LogLevel;
//!
//! LoggingBuilder::new()
//!     .level(LogLevel::Debug)
//!     .directive("phoneui_utils::bridge=trace")
//!     .init();
//! ```
//!
//! `RUST_LOG`, when set, replaces the configured base level; per-target
//! filters and directives are added on top.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogLevel, LogOutput, LoggingConfig};

const DEFAULT_LOG_FILE: &str = "phoneui.log";

/// Installs the global subscriber described by `config`.
///
/// A subscriber installed earlier (by the host or a test harness) is kept.
pub fn init_from_config(config: &LoggingConfig) {
    if let Err(e) = LoggingBuilder::from_config(config).try_init() {
        debug!(error = %e, "Global subscriber already set, keeping it");
    }
}

/// Builder for the global subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    directives: Vec<String>,
    with_target: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::from_config(&LoggingConfig::default())
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            config: config.clone(),
            directives: Vec::new(),
            with_target: true,
        }
    }

    /// Base level, used when `RUST_LOG` is not set.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Adds a raw filter directive such as `phoneui_gui=debug`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    /// Writes to `path` instead of a standard stream.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = LogOutput::File;
        self.config.file_path = Some(path.into());
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.config.thread_ids = enabled;
        self
    }

    /// Includes source file and line.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.config.file_location = enabled;
        self
    }

    fn directives(&self) -> impl Iterator<Item = String> + '_ {
        self.config
            .filters
            .iter()
            .map(|(target, level)| format!("{target}={level}"))
            .chain(self.directives.iter().cloned())
    }

    fn build_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_str()));
        for directive in self.directives() {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => warn!(directive = %directive, error = %e, "Ignoring invalid log filter directive"),
            }
        }
        filter
    }

    /// Installs the subscriber, ignoring a failure.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber, failing if one is already set.
    pub fn try_init(self) -> Result<(), TryInitError> {
        match self.config.output {
            LogOutput::Stdout => self.install(std::io::stdout),
            LogOutput::Stderr => self.install(std::io::stderr),
            LogOutput::File => match self.config.file_path.clone() {
                Some(path) => {
                    let dir = path.parent().unwrap_or_else(|| Path::new("."));
                    let name = path.file_name().unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));
                    let appender = tracing_appender::rolling::never(dir, name);
                    self.install(appender)
                }
                None => {
                    warn!("File output requested but no file path configured, falling back to stdout");
                    self.install(std::io::stdout)
                }
            },
        }
    }

    fn install<W>(self, writer: W) -> Result<(), TryInitError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let registry = tracing_subscriber::registry().with(self.build_filter());
        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(self.with_target)
            .with_thread_ids(self.config.thread_ids)
            .with_file(self.config.file_location)
            .with_line_number(self.config.file_location);

        match self.config.format {
            LogFormat::Compact => registry.with(layer.compact()).try_init(),
            LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => registry.with(layer.json()).try_init(),
            // Full, and Json without the `json-log` feature.
            _ => registry.with(layer).try_init(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_from_config() {
        let mut config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            thread_ids: true,
            file_location: true,
            ..Default::default()
        };
        config.filters.insert("phoneui_gui".into(), LogLevel::Trace);
        config.filters.insert("phoneui_utils::query".into(), LogLevel::Warn);

        let builder = LoggingBuilder::from_config(&config).directive("phoneui_core=info");
        assert_eq!(builder.config, config);
        assert_eq!(
            builder.directives().collect::<Vec<_>>(),
            vec!["phoneui_gui=trace", "phoneui_utils::query=warn", "phoneui_core=info"]
        );
    }

    #[test]
    fn test_file_sets_output() {
        let builder = LoggingBuilder::new().file("/tmp/phoneui-test.log");
        assert_eq!(builder.config.output, LogOutput::File);
        assert_eq!(builder.config.file_path, Some(PathBuf::from("/tmp/phoneui-test.log")));
    }

    #[test]
    fn test_init_is_once_per_process() {
        LoggingBuilder::new().output(LogOutput::Stderr).init();
        assert!(LoggingBuilder::new().try_init().is_err());
    }

    #[test]
    fn test_invalid_directive_is_skipped() {
        let filter = LoggingBuilder::new()
            .directive("not a directive=")
            .directive("phoneui_core=debug")
            .build_filter()
            .to_string();
        assert!(filter.contains("phoneui_core=debug"));
    }

    #[test]
    fn test_invalid_directive_is_reported() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            LoggingBuilder::new().directive("phoneui_core=loud").build_filter();
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Ignoring invalid log filter directive"));
        assert!(output.contains("phoneui_core=loud"));
    }
}
