//! Active health checker.
//!
//! Performs one HTTP reachability probe against one target.

use crate::health::{CheckResult, ProbeFailure};
use crate::target::Target;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while building a prober.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// A single reachability probe.
///
/// Implementations must not fail: every problem is reported as a down
/// [`CheckResult`] carrying a [`ProbeFailure`].
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &Target) -> CheckResult;
}

/// Settings for [`HttpProber`].
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Upper bound for a single probe.
    pub timeout: Duration,
    /// Treat self-signed or expired certificates as reachable.
    pub accept_invalid_certs: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            accept_invalid_certs: true,
        }
    }
}

/// Probes a target with a single HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProber {
    /// Create a new HTTP prober.
    pub fn new(config: &ProbeConfig) -> Result<Self, HealthError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("sitewatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, target: &Target) -> CheckResult {
        let url = target.url();
        let start = Instant::now();

        // The client timeout covers the request; this bounds DNS stalls too.
        let outcome = tokio::time::timeout(self.timeout, self.client.get(&url).send()).await;
        let elapsed = start.elapsed();

        let result = match outcome {
            Ok(Ok(response)) => {
                CheckResult::from_status(target.identifier(), elapsed, response.status().as_u16())
            }
            Ok(Err(e)) => CheckResult::failed(target.identifier(), classify_error(&e)),
            Err(_) => CheckResult::failed(target.identifier(), ProbeFailure::Timeout),
        };

        debug!(
            target = %target,
            url = %url,
            status = %result.status(),
            elapsed_ms = elapsed.as_millis() as u64,
            "probe finished"
        );

        result
    }
}

/// Map a transport error onto a failure reason.
fn classify_error(error: &reqwest::Error) -> ProbeFailure {
    if error.is_timeout() {
        ProbeFailure::Timeout
    } else if error.is_connect() {
        ProbeFailure::Connection
    } else {
        ProbeFailure::Other(error.to_string())
    }
}
