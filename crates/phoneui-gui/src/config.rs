//! Backend selection and dispatch policy configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// Library selection for one capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Library name the capability is served by.
    #[serde(default)]
    pub library: Option<String>,
}

/// Library selection for every capability, keyed by capability name.
///
/// ```toml
/// [backends.dialer]
/// library = "phoneui-efl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendsConfig {
    entries: BTreeMap<String, BackendConfig>,
}

impl BackendsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `library` for every capability.
    pub fn uniform(library: &str) -> Self {
        Capability::ALL
            .into_iter()
            .fold(Self::new(), |config, capability| config.with(capability, library))
    }

    pub fn with(mut self, capability: Capability, library: impl Into<String>) -> Self {
        self.entries.insert(
            capability.as_str().to_string(),
            BackendConfig {
                library: Some(library.into()),
            },
        );
        self
    }

    /// The configured library of `capability`, ignoring empty names.
    pub fn library(&self, capability: Capability) -> Option<&str> {
        self.entries
            .get(capability.as_str())
            .and_then(|entry| entry.library.as_deref())
            .filter(|library| !library.is_empty())
    }

    /// Configured names that are not capabilities.
    pub fn unknown(&self) -> Vec<&str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|name| name.parse::<Capability>().is_err())
            .collect()
    }

    /// Capabilities without a configured library.
    pub fn missing(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.library(*c).is_none())
            .collect()
    }
}

/// What dispatching to an absent entry point does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingOperationPolicy {
    /// Debug diagnostic, the dispatch succeeds as a no-op.
    #[default]
    Ignore,
    /// Warning diagnostic, the dispatch succeeds as a no-op.
    Warn,
    /// The dispatch fails with `GuiError::MissingOperation`.
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_by_capability_name() {
        let config: BackendsConfig = serde_json::from_value(json!({
            "dialer": { "library": "phoneui-efl" },
            "idle_screen": { "library": "" },
            "settings": {},
            "vibrator": { "library": "x" }
        }))
        .unwrap();

        assert_eq!(config.library(Capability::Dialer), Some("phoneui-efl"));
        assert_eq!(config.library(Capability::IdleScreen), None);
        assert_eq!(config.library(Capability::Settings), None);
        assert_eq!(config.missing().len(), 7);
        assert_eq!(config.unknown(), vec!["vibrator"]);
    }

    #[test]
    fn test_uniform() {
        let config = BackendsConfig::uniform("phoneui-test");
        assert!(config.missing().is_empty());
        assert_eq!(config.library(Capability::Calls), Some("phoneui-test"));
    }

    #[test]
    fn test_policy_names() {
        let policy: MissingOperationPolicy = serde_json::from_value(json!("warn")).unwrap();
        assert_eq!(policy, MissingOperationPolicy::Warn);
        assert_eq!(MissingOperationPolicy::default(), MissingOperationPolicy::Ignore);
    }
}
