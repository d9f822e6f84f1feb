//! Layered configuration on figment.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `phoneui.{profile}.{ext}` next to the main file
//! 3. `phoneui.{ext}`, from the first search directory that has one
//! 4. `PHONEUI_*` environment variables
//! 5. values merged programmatically
//!
//! Without explicit search paths, the current directory and
//! `$XDG_CONFIG_HOME/phoneui` are searched. Which extensions count depends
//! on the `toml-config` *(default)* and `yaml-config` features.
//!
//! Environment variables use `__` between sections:
//!
//! - `PHONEUI_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `PHONEUI_SERVICE__CALL_TIMEOUT_MS=5000` → `service.call_timeout_ms = 5000`
//! - `PHONEUI_BACKENDS__DIALER__LIBRARY=phoneui-efl` → `backends.dialer.library`

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::PhoneUiConfig;

const FILE_STEM: &str = "phoneui";
const ENV_PREFIX: &str = "PHONEUI_";
const PROFILE_VAR: &str = "PHONEUI_PROFILE";

/// Selects the `phoneui.{profile}.*` overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads `PHONEUI_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            "production" | "prod" => Self::Production,
            _ => Self::Custom(name.to_string()),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration file formats compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    /// Search order.
    const ENABLED: &'static [FileFormat] = &[
        #[cfg(feature = "toml-config")]
        FileFormat::Toml,
        #[cfg(feature = "yaml-config")]
        FileFormat::Yaml,
    ];

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            FileFormat::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            FileFormat::Yaml => &["yaml", "yml"],
        }
    }

    fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ENABLED
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
    }

    fn merge(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            FileFormat::Toml => figment.merge(Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            FileFormat::Yaml => figment.merge(Yaml::file(path)),
        }
    }
}

/// Builder over the configuration sources.
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("/etc/phoneui/phoneui.toml")
///     .without_env()
///     .load()?;
/// ```
pub struct ConfigLoader {
    /// Merged last, over every other source.
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Loaded instead of searching.
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a directory to search for `phoneui.*`.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(dir) => self.search_path(dir.join(FILE_STEM)),
            None => self,
        }
    }

    /// Loads exactly this file; it must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads `PHONEUI_*` variables (the default).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a whole configuration over the loaded one.
    pub fn merge(mut self, config: PhoneUiConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Merges inline TOML over the loaded configuration.
    #[cfg(feature = "toml-config")]
    pub fn toml_str(mut self, content: &str) -> Self {
        self.overrides = self.overrides.merge(Toml::string(content));
        self
    }

    pub fn load(self) -> ConfigResult<PhoneUiConfig> {
        let profile = self.profile.clone();
        let config: PhoneUiConfig = self
            .into_figment()?
            .extract()
            .map_err(|e| ConfigError::ParseError(format!("Failed to extract configuration: {e}")))?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            call_timeout_ms = config.service.call_timeout_ms,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn into_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(PhoneUiConfig::default()));

        let files = match &self.config_file {
            Some(path) => vec![Self::explicit_file(path)?],
            None => self.search_files(),
        };
        for (format, path) in files {
            info!(path = %path.display(), "Loading configuration file");
            figment = format.merge(figment, &path);
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Loading environment variables");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["profile"]).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }

    fn explicit_file(path: &Path) -> ConfigResult<(FileFormat, PathBuf)> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let format = FileFormat::of(path).ok_or_else(|| {
            ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: {}",
                path.display()
            ))
        })?;
        Ok((format, path.to_path_buf()))
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join(FILE_STEM)))
            .collect()
    }

    /// Files of the first search directory holding a main file, profile
    /// overlays first.
    fn search_files(&self) -> Vec<(FileFormat, PathBuf)> {
        for dir in self.search_dirs() {
            let mut overlays = Vec::new();
            let mut mains = Vec::new();
            for &format in FileFormat::ENABLED {
                for ext in format.extensions() {
                    let overlay = dir.join(format!("{FILE_STEM}.{}.{ext}", self.profile));
                    if overlay.exists() {
                        overlays.push((format, overlay));
                    }
                    let main = dir.join(format!("{FILE_STEM}.{ext}"));
                    if main.exists() {
                        mains.push((format, main));
                    }
                }
            }
            if !mains.is_empty() {
                overlays.extend(mains);
                return overlays;
            }
        }
        warn!("No configuration file found, using defaults");
        Vec::new()
    }
}
