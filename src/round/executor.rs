//! Check round executor.
//!
//! Fans a probe out to every target with bounded concurrency and joins all
//! results into a [`RoundResult`].

use crate::health::{CheckResult, Probe, ProbeFailure};
use crate::round::RoundResult;
use crate::target::TargetList;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

/// Default number of probes allowed in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Runs one probe per target, at most `max_in_flight` at a time.
#[derive(Clone)]
pub struct RoundExecutor {
    prober: Arc<dyn Probe>,
    max_in_flight: usize,
}

impl RoundExecutor {
    /// Create an executor. A limit of zero is raised to one.
    pub fn new(prober: Arc<dyn Probe>, max_in_flight: usize) -> Self {
        Self {
            prober,
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Probe every target and return once all of them have a result.
    ///
    /// Results keep target order. Dropping the returned future aborts any
    /// probes still running.
    pub async fn run(&self, targets: &TargetList) -> RoundResult {
        let gate = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();

        for (index, target) in targets.iter().cloned().enumerate() {
            let gate = Arc::clone(&gate);
            let prober = Arc::clone(&self.prober);

            tasks.spawn(async move {
                let _permit = gate.acquire_owned().await.ok();
                let result = match AssertUnwindSafe(prober.probe(&target)).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => {
                        let detail = panic_detail(panic.as_ref());
                        error!(target = %target, error = %detail, "probe panicked");
                        CheckResult::failed(target.identifier(), ProbeFailure::Other(detail))
                    }
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<CheckResult>> = (0..targets.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!(error = %e, "probe task did not complete"),
            }
        }

        let results = slots
            .into_iter()
            .zip(targets.iter())
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| {
                    CheckResult::failed(
                        target.identifier(),
                        ProbeFailure::Other("probe task failed".to_string()),
                    )
                })
            })
            .collect();

        RoundResult::new(results)
    }
}

fn panic_detail(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "probe panicked".to_string()
    }
}
