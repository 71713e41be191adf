//! sitewatch - periodic reachability monitor for domains and IP addresses
//!
//! This crate provides:
//! - Concurrent HTTPS probing with a bounded number of in-flight checks
//! - Down-state tracking across rounds, alerting only on new failures
//! - Pluggable alert dispatchers (log, webhook)
//! - YAML configuration with target files
//! - Prometheus metrics

pub mod alert;
pub mod config;
pub mod health;
pub mod metrics;
pub mod monitor;
pub mod report;
pub mod round;
pub mod target;
pub mod transition;
pub mod util;

pub use config::Config;
pub use monitor::{Monitor, MonitorState, RoundOutcome};
