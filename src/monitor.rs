//! Monitoring loop.
//!
//! Runs check rounds on a fixed interval, carries the previous round's down
//! set from one round into the next, and alerts only on targets that are
//! newly down.

use crate::alert::{Alert, AlertDispatcher, DispatchError, LogDispatcher, WebhookDispatcher};
use crate::config::{Config, MonitorConfig};
use crate::health::{HealthError, HttpProber, Probe, ProbeConfig};
use crate::metrics::MetricsCollector;
use crate::report::{LogReporter, RoundReport, RoundReporter};
use crate::round::{DownSet, RoundExecutor, RoundResult};
use crate::target::TargetList;
use crate::transition::{track, Transition};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Errors that can occur while assembling a monitor from configuration.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to create prober: {0}")]
    Health(#[from] HealthError),

    #[error("failed to create alert dispatcher: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Lifecycle of a [`Monitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Everything produced by one round.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// Round number, starting at 1.
    pub round: u64,
    pub results: RoundResult,
    /// Down set to carry into the next round.
    pub down: DownSet,
    pub transition: Transition,
    /// Whether a new-failure alert was handed to the dispatcher.
    pub alerted: bool,
}

/// Periodic reachability monitor.
pub struct Monitor {
    config: MonitorConfig,
    targets: TargetList,
    executor: RoundExecutor,
    dispatcher: Arc<dyn AlertDispatcher>,
    reporter: Arc<dyn RoundReporter>,
    metrics: Option<MetricsCollector>,
    max_rounds: Option<u64>,
    state: MonitorState,
}

impl Monitor {
    /// Create a monitor using the given probe and dispatcher.
    pub fn new(
        config: MonitorConfig,
        targets: TargetList,
        prober: Arc<dyn Probe>,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Self {
        let executor = RoundExecutor::new(prober, config.max_concurrency);
        Self {
            config,
            targets,
            executor,
            dispatcher,
            reporter: Arc::new(LogReporter),
            metrics: None,
            max_rounds: None,
            state: MonitorState::Idle,
        }
    }

    /// Create a monitor with an HTTP prober and the configured dispatcher.
    pub fn from_config(config: &Config, targets: TargetList) -> Result<Self, MonitorError> {
        let settings = config.monitor_config();

        let prober = HttpProber::new(&ProbeConfig {
            timeout: settings.timeout,
            accept_invalid_certs: settings.accept_invalid_certs,
        })?;

        let dispatcher: Arc<dyn AlertDispatcher> = match config.notifications.webhook_url {
            Some(ref url) => Arc::new(WebhookDispatcher::new(url.clone(), settings.timeout)?),
            None => Arc::new(LogDispatcher),
        };

        Ok(Self::new(settings, targets, Arc::new(prober), dispatcher))
    }

    /// Replace the default log reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn RoundReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Record round and alert metrics.
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Stop after `rounds` rounds instead of running until shutdown.
    pub fn with_max_rounds(mut self, rounds: u64) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn targets(&self) -> &TargetList {
        &self.targets
    }

    /// Run one round against `previous` and dispatch any alerts it calls for.
    ///
    /// Dispatch failures are logged and otherwise ignored; the returned down
    /// set is valid either way.
    pub async fn run_round(&self, round: u64, previous: &DownSet) -> RoundOutcome {
        let results = self.executor.run(&self.targets).await;
        let down = results.down_set();
        let transition = track(&down, previous);

        self.reporter.report(&RoundReport {
            round,
            results: &results,
            transition: &transition,
        });

        if let Some(ref metrics) = self.metrics {
            metrics.record_round(&results);
        }

        let mut alerted = false;
        if self.config.notifications_enabled {
            if !transition.newly_down.is_empty() {
                let alert = Alert::for_new_failures(&results, &transition.newly_down);
                self.dispatch(&alert).await;
                alerted = true;
            }

            if self.config.notify_recoveries && !transition.recovered.is_empty() {
                let alert = Alert::for_recoveries(&results, &transition.recovered);
                self.dispatch(&alert).await;
            }
        }

        RoundOutcome {
            round,
            results,
            down,
            transition,
            alerted,
        }
    }

    /// Run rounds until shutdown is signalled or the round limit is reached.
    ///
    /// A shutdown during a round abandons it; a shutdown during the pause
    /// between rounds cuts the pause short. Returns the number of completed rounds.
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) -> u64 {
        self.state = MonitorState::Running;
        info!(
            targets = self.targets.len(),
            interval = %humantime::format_duration(self.config.interval),
            timeout = %humantime::format_duration(self.config.timeout),
            max_concurrency = self.executor.max_in_flight(),
            "monitoring started"
        );
        if self.config.notifications_enabled {
            info!(recipient = %self.config.notify_target, "alerts enabled");
        } else {
            info!("alerts disabled");
        }

        let mut previous = DownSet::new();
        let mut completed = 0u64;

        loop {
            let outcome = tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    info!(round = completed + 1, "shutdown requested, abandoning in-flight round");
                    break;
                }

                outcome = self.run_round(completed + 1, &previous) => outcome,
            };

            previous = outcome.down;
            completed += 1;

            if self.max_rounds.is_some_and(|max| completed >= max) {
                info!(rounds = completed, "round limit reached");
                break;
            }

            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    info!("shutdown requested");
                    break;
                }

                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        self.state = MonitorState::Stopping;
        info!(rounds = completed, still_down = previous.len(), "monitoring stopping");
        self.state = MonitorState::Stopped;
        completed
    }

    async fn dispatch(&self, alert: &Alert) {
        let recipient = &self.config.notify_target;
        let delivered = match self
            .dispatcher
            .notify(&alert.subject, &alert.body, recipient)
            .await
        {
            Ok(()) => {
                info!(recipient = %recipient, subject = %alert.subject, "alert sent");
                true
            }
            Err(e) => {
                error!(recipient = %recipient, error = %e, "failed to send alert");
                false
            }
        };

        if let Some(ref metrics) = self.metrics {
            metrics.record_alert(delivered);
        }
    }
}
