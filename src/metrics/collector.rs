//! Metrics collector using prometheus-client.
//!
//! Provides metrics for probe outcomes, probe latency, target status, rounds
//! and alert delivery.

use crate::health::CheckResult;
use crate::round::RoundResult;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::sync::Arc;

/// Labels for per-target metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TargetLabels {
    pub target: String,
}

/// Labels for probe result metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ProbeLabels {
    pub target: String,
    pub result: ProbeOutcome,
}

/// Result of a probe.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum ProbeOutcome {
    Up,
    Down,
}

/// Labels for alert delivery metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct AlertLabels {
    pub outcome: AlertOutcome,
}

/// Whether an alert reached its transport.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum AlertOutcome {
    Sent,
    Failed,
}

/// Collects and stores all metrics.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsCollectorInner>,
}

struct MetricsCollectorInner {
    /// Probe results counter.
    probes_total: Family<ProbeLabels, Counter>,
    /// Probe response time histogram (in seconds).
    probe_duration_seconds: Family<TargetLabels, Histogram>,
    /// Target status gauge (1 = up, 0 = down).
    target_up: Family<TargetLabels, Gauge>,
    /// Completed rounds counter.
    rounds_total: Counter,
    /// Alert dispatch counter.
    alerts_total: Family<AlertLabels, Counter>,
    /// The prometheus registry.
    registry: Registry,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let probes_total = Family::<ProbeLabels, Counter>::default();
        let probe_duration_seconds = Family::<TargetLabels, Histogram>::new_with_constructor(|| {
            // Buckets: 1ms, 2.5ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
            Histogram::new(exponential_buckets(0.001, 2.5, 13))
        });
        let target_up = Family::<TargetLabels, Gauge>::default();
        let rounds_total = Counter::default();
        let alerts_total = Family::<AlertLabels, Counter>::default();

        registry.register(
            "sitewatch_probes",
            "Total number of probes performed",
            probes_total.clone(),
        );
        registry.register(
            "sitewatch_probe_duration_seconds",
            "Probe response time in seconds",
            probe_duration_seconds.clone(),
        );
        registry.register(
            "sitewatch_target_up",
            "Target status from the last round (1=up, 0=down)",
            target_up.clone(),
        );
        registry.register(
            "sitewatch_rounds",
            "Total number of completed check rounds",
            rounds_total.clone(),
        );
        registry.register(
            "sitewatch_alerts",
            "Total number of alerts dispatched",
            alerts_total.clone(),
        );

        Self {
            inner: Arc::new(MetricsCollectorInner {
                probes_total,
                probe_duration_seconds,
                target_up,
                rounds_total,
                alerts_total,
                registry,
            }),
        }
    }

    /// Get the prometheus registry for encoding.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Record a single probe result.
    pub fn record_probe(&self, result: &CheckResult) {
        let target = result.target().to_string();
        let labels = ProbeLabels {
            target: target.clone(),
            result: if result.is_up() {
                ProbeOutcome::Up
            } else {
                ProbeOutcome::Down
            },
        };
        self.inner.probes_total.get_or_create(&labels).inc();

        let target_labels = TargetLabels { target };
        if let Some(ms) = result.response_time_ms() {
            self.inner
                .probe_duration_seconds
                .get_or_create(&target_labels)
                .observe(ms / 1000.0);
        }
        self.inner
            .target_up
            .get_or_create(&target_labels)
            .set(if result.is_up() { 1 } else { 0 });
    }

    /// Record every probe in a finished round and count the round.
    pub fn record_round(&self, round: &RoundResult) {
        for result in round {
            self.record_probe(result);
        }
        self.inner.rounds_total.inc();
    }

    /// Record an alert dispatch attempt.
    pub fn record_alert(&self, delivered: bool) {
        let labels = AlertLabels {
            outcome: if delivered {
                AlertOutcome::Sent
            } else {
                AlertOutcome::Failed
            },
        };
        self.inner.alerts_total.get_or_create(&labels).inc();
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ProbeFailure;
    use prometheus_client::encoding::text::encode;
    use std::time::Duration;

    fn encoded(collector: &MetricsCollector) -> String {
        let mut buffer = String::new();
        encode(&mut buffer, collector.registry()).unwrap();
        buffer
    }

    #[test]
    fn test_metrics_collector_new() {
        let collector = MetricsCollector::new();
        let _ = collector.registry();
    }

    #[test]
    fn test_record_round() {
        let collector = MetricsCollector::new();
        let round = RoundResult::new(vec![
            CheckResult::up("ok.example.com", Duration::from_millis(25), 200),
            CheckResult::failed("bad.example.com", ProbeFailure::Connection),
        ]);
        collector.record_round(&round);

        let buffer = encoded(&collector);
        assert!(buffer.contains("sitewatch_rounds_total 1"));
        assert!(buffer.contains("sitewatch_target_up{target=\"ok.example.com\"} 1"));
        assert!(buffer.contains("sitewatch_target_up{target=\"bad.example.com\"} 0"));
        assert!(buffer.contains("sitewatch_probe_duration_seconds"));
    }

    #[test]
    fn test_record_alert() {
        let collector = MetricsCollector::new();
        collector.record_alert(true);
        collector.record_alert(false);
        collector.record_alert(false);

        let buffer = encoded(&collector);
        assert!(buffer.contains("sitewatch_alerts_total{outcome=\"Sent\"} 1"));
        assert!(buffer.contains("sitewatch_alerts_total{outcome=\"Failed\"} 2"));
    }
}
