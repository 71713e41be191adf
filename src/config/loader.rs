//! Configuration file loading.

use crate::config::{validate_config, Config};
use crate::target::{load_targets_file, Target, TargetError, TargetList};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),

    #[error("invalid target list: {0}")]
    TargetError(#[from] TargetError),
}

/// Load configuration from a YAML file.
///
/// This function reads the file, parses the YAML, and validates the configuration.
///
/// # Arguments
///
/// * `path` - Path to the configuration file
///
/// # Returns
///
/// The parsed and validated configuration, or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    // Read file contents
    let contents = std::fs::read_to_string(path)?;

    // Parse YAML
    let config: Config = serde_yaml::from_str(&contents)?;

    // Validate configuration
    validate_config(&config).map_err(ConfigError::ValidationError)?;

    Ok(config)
}

/// Build the target list from inline targets followed by the targets file.
///
/// A relative `targets_file` is resolved against `base_dir` when given.
pub fn load_targets(config: &Config, base_dir: Option<&Path>) -> Result<TargetList, ConfigError> {
    let mut targets = config
        .targets
        .iter()
        .map(|id| Target::parse(id.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(ref file) = config.targets_file {
        let path = match base_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.clone(),
        };
        targets.extend(load_targets_file(&path)?);
    }

    Ok(TargetList::new(targets)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
notifications:
  recipient: ops@example.com

targets:
  - example.com
  - 10.0.0.1
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.notifications.recipient, "ops@example.com");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.yaml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::ReadError(_)));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not: valid: yaml: {{{}}}").unwrap();

        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_fails_validation() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"targets: []\nnotifications:\n  enabled: false\n").unwrap();

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_targets_combines_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sites.txt"), "b.example.com\n# skip\n\nc.example.com\n").unwrap();

        let mut config = Config::default();
        config.targets = vec!["a.example.com".to_string()];
        config.targets_file = Some("sites.txt".into());

        let targets = load_targets(&config, Some(dir.path())).unwrap();
        let ids: Vec<&str> = targets.iter().map(Target::identifier).collect();
        assert_eq!(ids, vec!["a.example.com", "b.example.com", "c.example.com"]);
    }

    #[test]
    fn test_load_targets_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sites.txt"), "# nothing here\n").unwrap();

        let mut config = Config::default();
        config.targets_file = Some(dir.path().join("sites.txt"));

        let result = load_targets(&config, None);
        assert!(matches!(result, Err(ConfigError::TargetError(TargetError::Empty))));
    }
}
