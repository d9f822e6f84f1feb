//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, PhoneUiConfig, ServiceConfig};

/// Validates the entire configuration.
///
/// Capabilities without a library are not an error here: the registry
/// reports them when it loads the backends.
pub fn validate_config(config: &PhoneUiConfig) -> ConfigResult<()> {
    if let Some(name) = config.backends.unknown().first() {
        return Err(ConfigError::UnknownCapability(name.to_string()));
    }
    validate_service_config(&config.service)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_service_config(service: &ServiceConfig) -> ConfigResult<()> {
    if service.call_timeout_ms == 0 {
        return Err(ConfigError::validation("Call timeout must be greater than 0"));
    }
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "File log output requires logging.file_path",
        ));
    }
    if let Some(target) = logging.filters.keys().find(|t| t.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid log filter target: {target:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use phoneui_gui::BackendsConfig;
    use serde_json::json;

    #[test]
    fn test_default_config_validates() {
        assert!(validate_config(&PhoneUiConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = PhoneUiConfig::default();
        config.service.call_timeout_ms = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_unknown_capability_rejected() {
        let mut config = PhoneUiConfig::default();
        config.backends = serde_json::from_value::<BackendsConfig>(json!({
            "dialer": { "library": "a" },
            "keyboard": { "library": "b" }
        }))
        .unwrap();

        match validate_config(&config) {
            Err(ConfigError::UnknownCapability(name)) => assert_eq!(name, "keyboard"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = PhoneUiConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("/tmp/phoneui.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_blank_filter_target_rejected() {
        let mut config = PhoneUiConfig::default();
        config.logging.filters.insert(" ".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
