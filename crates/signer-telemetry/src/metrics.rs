//! Prometheus metrics for signature aggregation.
//!
//! Metrics follow the naming convention `ws_<area>_<metric>_<unit>`.
//!
//! - `ws_aggregation_attempts_total` - attempts started
//! - `ws_aggregation_attempt_failures_total{reason}` - failed attempts by cause
//! - `ws_aggregation_runs_total{outcome}` - finished runs (`success` / `exhausted` / `aborted`)
//! - `ws_aggregation_attempt_duration_seconds` - wall time per attempt

use crate::TelemetryError;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Exhausted,
    Aborted,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Success => "success",
            RunOutcome::Exhausted => "exhausted",
            RunOutcome::Aborted => "aborted",
        }
    }
}

/// Aggregation counters, registered into a caller-owned registry.
#[derive(Clone)]
pub struct AggregationMetrics {
    attempts: IntCounter,
    attempt_failures: IntCounterVec,
    runs: IntCounterVec,
    attempt_duration: Histogram,
}

impl AggregationMetrics {
    /// Create the metrics and register them with `registry`.
    pub fn new(registry: &Registry) -> Result<Self, TelemetryError> {
        let attempts = IntCounter::new(
            "ws_aggregation_attempts_total",
            "Total signature aggregation attempts started",
        )?;
        let attempt_failures = IntCounterVec::new(
            Opts::new(
                "ws_aggregation_attempt_failures_total",
                "Aggregation attempts that did not produce a signature",
            ),
            &["reason"],
        )?;
        let runs = IntCounterVec::new(
            Opts::new("ws_aggregation_runs_total", "Finished aggregation runs"),
            &["outcome"],
        )?;
        let attempt_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ws_aggregation_attempt_duration_seconds",
                "Wall time spent per aggregation attempt",
            )
            .buckets(exponential_buckets(0.01, 2.0, 12)?),
        )?;

        registry.register(Box::new(attempts.clone()))?;
        registry.register(Box::new(attempt_failures.clone()))?;
        registry.register(Box::new(runs.clone()))?;
        registry.register(Box::new(attempt_duration.clone()))?;

        Ok(Self {
            attempts,
            attempt_failures,
            runs,
            attempt_duration,
        })
    }

    pub fn record_attempt(&self) {
        self.attempts.inc();
    }

    pub fn record_attempt_failure(&self, reason: &str) {
        self.attempt_failures.with_label_values(&[reason]).inc();
    }

    pub fn record_run(&self, outcome: RunOutcome) {
        self.runs.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn observe_attempt_duration(&self, seconds: f64) {
        self.attempt_duration.observe(seconds);
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.get()
    }

    pub fn attempt_failures(&self, reason: &str) -> u64 {
        self.attempt_failures.with_label_values(&[reason]).get()
    }

    pub fn runs(&self, outcome: RunOutcome) -> u64 {
        self.runs.with_label_values(&[outcome.as_str()]).get()
    }
}

/// Encode every metric in `registry` as Prometheus text format.
pub fn encode_metrics(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let registry = Registry::new();
        let metrics = AggregationMetrics::new(&registry).unwrap();
        assert_eq!(metrics.attempts(), 0);
        assert_eq!(metrics.runs(RunOutcome::Success), 0);
    }

    #[test]
    fn test_record_and_read_back() {
        let registry = Registry::new();
        let metrics = AggregationMetrics::new(&registry).unwrap();
        metrics.record_attempt();
        metrics.record_attempt();
        metrics.record_attempt_failure("insufficient_weight");
        metrics.record_run(RunOutcome::Exhausted);

        assert_eq!(metrics.attempts(), 2);
        assert_eq!(metrics.attempt_failures("insufficient_weight"), 1);
        assert_eq!(metrics.attempt_failures("timeout"), 0);
        assert_eq!(metrics.runs(RunOutcome::Exhausted), 1);
    }

    #[test]
    fn test_registries_are_independent() {
        let a = AggregationMetrics::new(&Registry::new()).unwrap();
        let b = AggregationMetrics::new(&Registry::new()).unwrap();
        a.record_attempt();
        assert_eq!(a.attempts(), 1);
        assert_eq!(b.attempts(), 0);
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        AggregationMetrics::new(&registry).unwrap();
        assert!(matches!(
            AggregationMetrics::new(&registry),
            Err(TelemetryError::MetricsInit(_))
        ));
    }

    #[test]
    fn test_encode_contains_metric_names() {
        let registry = Registry::new();
        let metrics = AggregationMetrics::new(&registry).unwrap();
        metrics.record_attempt();
        metrics.record_run(RunOutcome::Success);
        let text = encode_metrics(&registry).unwrap();
        assert!(text.contains("ws_aggregation_attempts_total 1"));
        assert!(text.contains("ws_aggregation_runs_total{outcome=\"success\"} 1"));
    }
}
