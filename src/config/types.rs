//! Configuration data types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// Round scheduling and probe settings
    #[serde(default)]
    pub monitor: MonitorSettings,

    /// Alert delivery settings
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Inline target identifiers
    #[serde(default)]
    pub targets: Vec<String>,

    /// Line-oriented file with more target identifiers
    #[serde(default)]
    pub targets_file: Option<PathBuf>,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub log_format: LogFormat,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Whether metrics endpoint is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Address to bind metrics server
    #[serde(default = "default_metrics_address")]
    pub address: SocketAddr,

    /// Path for metrics endpoint
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: default_metrics_address(),
            path: default_metrics_path(),
        }
    }
}

/// Round scheduling and probe settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorSettings {
    /// Pause between the end of one round and the start of the next
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Upper bound for a single probe
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Probes allowed in flight at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Treat self-signed or expired certificates as reachable
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            timeout: default_timeout(),
            max_concurrency: default_max_concurrency(),
            accept_invalid_certs: true,
        }
    }
}

/// Alert delivery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Whether alerts are dispatched at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Who receives alerts
    #[serde(default)]
    pub recipient: String,

    /// POST alerts here; log them when unset
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Also notify when down targets come back up
    #[serde(default)]
    pub notify_recoveries: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recipient: String::new(),
            webhook_url: None,
            notify_recoveries: false,
        }
    }
}

/// Resolved settings the monitoring loop runs with. Immutable during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub timeout: Duration,
    pub max_concurrency: usize,
    pub accept_invalid_certs: bool,
    pub notifications_enabled: bool,
    pub notify_target: String,
    pub notify_recoveries: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Config::default().monitor_config()
    }
}

impl Config {
    /// Resolve the settings the monitoring loop needs.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: self.monitor.interval,
            timeout: self.monitor.timeout,
            max_concurrency: self.monitor.max_concurrency,
            accept_invalid_certs: self.monitor.accept_invalid_certs,
            notifications_enabled: self.notifications.enabled,
            notify_target: self.notifications.recipient.clone(),
            notify_recoveries: self.notifications.notify_recoveries,
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9090))
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_concurrency() -> usize {
    10
}

/// Custom serde module for humantime durations.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
