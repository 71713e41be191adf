//! Configuration validation.

use crate::config::Config;
use std::time::Duration;

/// Validate the configuration.
///
/// Checks for:
/// - At least one target source (inline list or targets file)
/// - No empty inline target identifiers
/// - Non-zero interval, timeout and concurrency
/// - A recipient when notifications are enabled
/// - An http(s) webhook URL when one is set
/// - A known log level
///
/// # Returns
///
/// `Ok(())` if valid, or an error message describing the problem.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    // Check for at least one target source
    if config.targets.is_empty() && config.targets_file.is_none() {
        errors.push("at least one target or a targets_file must be defined".to_string());
    }

    if config.targets.iter().any(|t| t.trim().is_empty()) {
        errors.push("target identifier cannot be empty".to_string());
    }

    if config.monitor.interval == Duration::ZERO {
        errors.push("monitor interval must be greater than 0".to_string());
    }

    if config.monitor.timeout == Duration::ZERO {
        errors.push("monitor timeout must be greater than 0".to_string());
    }

    if config.monitor.max_concurrency == 0 {
        errors.push("monitor max_concurrency must be at least 1".to_string());
    }

    let notifications = &config.notifications;
    if notifications.enabled && notifications.recipient.trim().is_empty() {
        errors.push("notifications are enabled but no recipient is configured".to_string());
    }

    if let Some(ref url) = notifications.webhook_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!(
                "webhook_url '{}' must start with http:// or https://",
                url
            ));
        }
    }

    if config.global.metrics.enabled && !config.global.metrics.path.starts_with('/') {
        errors.push(format!(
            "metrics path '{}' must start with '/'",
            config.global.metrics.path
        ));
    }

    // Validate log level
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn minimal_config() -> Config {
        let mut config = Config::default();
        config.targets = vec!["example.com".to_string()];
        config.notifications.recipient = "ops@example.com".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        let config = minimal_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_no_targets() {
        let mut config = minimal_config();
        config.targets.clear();
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("at least one target"));
    }

    #[test]
    fn test_targets_file_is_a_source() {
        let mut config = minimal_config();
        config.targets.clear();
        config.targets_file = Some(PathBuf::from("targets.txt"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_identifier() {
        let mut config = minimal_config();
        config.targets.push("  ".to_string());
        let result = validate_config(&config);
        assert!(result.unwrap_err().contains("cannot be empty"));
    }

    #[test]
    fn test_zero_interval_and_timeout() {
        let mut config = minimal_config();
        config.monitor.interval = Duration::ZERO;
        config.monitor.timeout = Duration::ZERO;
        let err = validate_config(&config).unwrap_err();
        assert!(err.contains("interval must be greater than 0"));
        assert!(err.contains("timeout must be greater than 0"));
    }

    #[test]
    fn test_zero_concurrency() {
        let mut config = minimal_config();
        config.monitor.max_concurrency = 0;
        assert!(validate_config(&config).unwrap_err().contains("max_concurrency"));
    }

    #[test]
    fn test_missing_recipient() {
        let mut config = minimal_config();
        config.notifications.recipient.clear();
        assert!(validate_config(&config).unwrap_err().contains("no recipient"));

        // Fine when notifications are off
        config.notifications.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_bad_webhook_url() {
        let mut config = minimal_config();
        config.notifications.webhook_url = Some("ftp://hooks.example.com".to_string());
        assert!(validate_config(&config).unwrap_err().contains("webhook_url"));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = minimal_config();
        config.global.log_level = "loud".to_string();
        assert!(validate_config(&config).unwrap_err().contains("invalid log level"));
    }
}
