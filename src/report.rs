//! Per-round status reporting.
//!
//! Reporters only render. They receive the finished round and its transitions
//! and cannot influence alerting.

use crate::round::RoundResult;
use crate::transition::Transition;
use tracing::{debug, info, warn};

/// Everything the monitor knows about one finished round.
#[derive(Debug, Clone, Copy)]
pub struct RoundReport<'a> {
    /// Round number, starting at 1.
    pub round: u64,
    pub results: &'a RoundResult,
    pub transition: &'a Transition,
}

/// Display collaborator invoked once per round.
pub trait RoundReporter: Send + Sync {
    fn report(&self, report: &RoundReport<'_>);
}

/// Renders rounds through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LogReporter;

impl RoundReporter for LogReporter {
    fn report(&self, report: &RoundReport<'_>) {
        let newly_down = &report.transition.newly_down;

        for result in report.results {
            if result.is_up() {
                debug!(
                    round = report.round,
                    target = %result.target(),
                    status_code = result.status_code().unwrap_or_default(),
                    response_time_ms = result.response_time_ms().unwrap_or_default(),
                    "target up"
                );
            } else if newly_down.contains(result.target()) {
                warn!(
                    round = report.round,
                    target = %result.target(),
                    error = %result.error().unwrap_or_default(),
                    "target went down"
                );
            } else {
                debug!(
                    round = report.round,
                    target = %result.target(),
                    error = %result.error().unwrap_or_default(),
                    "target still down"
                );
            }
        }

        for id in report.transition.recovered.iter() {
            info!(round = report.round, target = %id, "target recovered");
        }

        info!(
            round = report.round,
            up = report.results.up_count(),
            down = report.results.down_count(),
            newly_down = newly_down.len(),
            recovered = report.transition.recovered.len(),
            "round complete"
        );
    }
}
