//! Probe outcomes.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Classified reachability of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeStatus {
    Up,
    Down,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Up => f.write_str("UP"),
            ProbeStatus::Down => f.write_str("DOWN"),
        }
    }
}

/// Why a probe classified its target as down.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProbeFailure {
    /// The server answered with a status code >= 400.
    HttpStatus(u16),
    /// Connection refused/reset, DNS failure or TLS failure.
    Connection,
    /// The probe did not complete within the configured timeout.
    Timeout,
    /// Anything else, carrying the failure detail.
    Other(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::HttpStatus(code) => write!(f, "HTTP Error: {}", code),
            ProbeFailure::Connection => f.write_str("connection error"),
            ProbeFailure::Timeout => f.write_str("timeout"),
            ProbeFailure::Other(detail) => f.write_str(detail),
        }
    }
}

impl Serialize for ProbeFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Result of probing one target in one round. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    target: String,
    status: ProbeStatus,
    response_time_ms: Option<f64>,
    status_code: Option<u16>,
    error: Option<ProbeFailure>,
}

impl CheckResult {
    /// A reachable target.
    pub fn up(target: impl Into<String>, response_time: Duration, status_code: u16) -> Self {
        Self {
            target: target.into(),
            status: ProbeStatus::Up,
            response_time_ms: Some(round_millis(response_time)),
            status_code: Some(status_code),
            error: None,
        }
    }

    /// The server answered, but with an error status.
    pub fn http_error(target: impl Into<String>, response_time: Duration, status_code: u16) -> Self {
        Self {
            target: target.into(),
            status: ProbeStatus::Down,
            response_time_ms: Some(round_millis(response_time)),
            status_code: Some(status_code),
            error: Some(ProbeFailure::HttpStatus(status_code)),
        }
    }

    /// The probe failed before any response arrived.
    pub fn failed(target: impl Into<String>, failure: ProbeFailure) -> Self {
        Self {
            target: target.into(),
            status: ProbeStatus::Down,
            response_time_ms: None,
            status_code: None,
            error: Some(failure),
        }
    }

    /// Classify a received HTTP status: anything below 400 is up.
    pub fn from_status(target: impl Into<String>, response_time: Duration, status_code: u16) -> Self {
        if status_code < 400 {
            Self::up(target, response_time, status_code)
        } else {
            Self::http_error(target, response_time, status_code)
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    pub fn is_up(&self) -> bool {
        self.status == ProbeStatus::Up
    }

    pub fn is_down(&self) -> bool {
        self.status == ProbeStatus::Down
    }

    /// Wall-clock response time in milliseconds, rounded to two decimals.
    pub fn response_time_ms(&self) -> Option<f64> {
        self.response_time_ms
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn failure(&self) -> Option<&ProbeFailure> {
        self.error.as_ref()
    }

    /// Human-readable error, if the target is down.
    pub fn error(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_below_400_is_up() {
        for code in [200, 204, 301, 302, 399] {
            let result = CheckResult::from_status("example.com", Duration::from_millis(12), code);
            assert!(result.is_up(), "status {} should be up", code);
            assert_eq!(result.status_code(), Some(code));
            assert!(result.error().is_none());
        }
    }

    #[test]
    fn test_status_400_and_above_is_down() {
        let result = CheckResult::from_status("example.com", Duration::from_millis(40), 503);
        assert!(result.is_down());
        assert_eq!(result.status_code(), Some(503));
        assert_eq!(result.error().as_deref(), Some("HTTP Error: 503"));
        assert!(result.response_time_ms().is_some());

        let result = CheckResult::from_status("example.com", Duration::from_millis(40), 400);
        assert!(result.is_down());
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(ProbeFailure::Connection.to_string(), "connection error");
        assert_eq!(ProbeFailure::Timeout.to_string(), "timeout");
        assert_eq!(ProbeFailure::HttpStatus(404).to_string(), "HTTP Error: 404");
        assert_eq!(ProbeFailure::Other("boom".into()).to_string(), "boom");
    }

    #[test]
    fn test_failed_has_no_timing() {
        let result = CheckResult::failed("example.com", ProbeFailure::Timeout);
        assert!(result.is_down());
        assert!(result.response_time_ms().is_none());
        assert!(result.status_code().is_none());
        assert_eq!(result.failure(), Some(&ProbeFailure::Timeout));
    }

    #[test]
    fn test_response_time_rounding() {
        let result = CheckResult::up("example.com", Duration::from_micros(12_346), 200);
        assert_eq!(result.response_time_ms(), Some(12.35));
    }
}
