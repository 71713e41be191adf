//! Health checking for monitored targets.

mod checker;
mod result;

pub use checker::{HealthError, HttpProber, Probe, ProbeConfig};
pub use result::{CheckResult, ProbeFailure, ProbeStatus};
