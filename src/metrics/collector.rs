//! Metrics collection using Prometheus

use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Entry and contest metrics
    engine_metrics: EngineMetrics,
}

/// Entry lifecycle and contest application metrics
#[derive(Clone)]
pub struct EngineMetrics {
    /// Contests applied for the first time
    pub contests_applied_total: IntCounter,

    /// Contest submissions answered with the prior outcome
    pub contests_replayed_total: IntCounter,

    /// Contest submissions rejected, by error kind
    pub contest_rejections_total: IntCounterVec,

    /// Entry lock acquisitions that timed out
    pub lock_timeouts_total: IntCounter,

    /// Successful opt-ins (new or reactivated)
    pub entries_opted_in_total: IntCounter,

    /// Successful opt-outs
    pub entries_opted_out_total: IntCounter,

    /// Time to apply one contest, including lock waits
    pub contest_apply_duration_seconds: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let engine_metrics = EngineMetrics::new(&registry)?;

        Ok(Self {
            registry,
            engine_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get engine metrics
    pub fn engine(&self) -> &EngineMetrics {
        &self.engine_metrics
    }

    /// Record a contest outcome
    pub fn record_contest_applied(&self, replayed: bool, duration: Duration) {
        if replayed {
            self.engine_metrics.contests_replayed_total.inc();
        } else {
            self.engine_metrics.contests_applied_total.inc();
        }

        self.engine_metrics
            .contest_apply_duration_seconds
            .observe(duration.as_secs_f64());
    }

    /// Record a rejected contest submission
    pub fn record_contest_rejected(&self, kind: &str) {
        self.engine_metrics
            .contest_rejections_total
            .with_label_values(&[kind])
            .inc();

        if kind == "lock_timeout" {
            self.engine_metrics.lock_timeouts_total.inc();
        }
    }

    /// Record an opt-in
    pub fn record_opt_in(&self) {
        self.engine_metrics.entries_opted_in_total.inc();
    }

    /// Record an opt-out
    pub fn record_opt_out(&self) {
        self.engine_metrics.entries_opted_out_total.inc();
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl EngineMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let contests_applied_total = IntCounter::new(
            "leaderboard_contests_applied_total",
            "Contests applied to a leaderboard",
        )?;
        registry.register(Box::new(contests_applied_total.clone()))?;

        let contests_replayed_total = IntCounter::new(
            "leaderboard_contests_replayed_total",
            "Contest submissions answered with the prior outcome",
        )?;
        registry.register(Box::new(contests_replayed_total.clone()))?;

        let contest_rejections_total = IntCounterVec::new(
            Opts::new(
                "leaderboard_contest_rejections_total",
                "Contest submissions rejected",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(contest_rejections_total.clone()))?;

        let lock_timeouts_total = IntCounter::new(
            "leaderboard_lock_timeouts_total",
            "Entry lock acquisitions that timed out",
        )?;
        registry.register(Box::new(lock_timeouts_total.clone()))?;

        let entries_opted_in_total = IntCounter::new(
            "leaderboard_entries_opted_in_total",
            "Entries created or reactivated",
        )?;
        registry.register(Box::new(entries_opted_in_total.clone()))?;

        let entries_opted_out_total = IntCounter::new(
            "leaderboard_entries_opted_out_total",
            "Entries disabled",
        )?;
        registry.register(Box::new(entries_opted_out_total.clone()))?;

        let contest_apply_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "leaderboard_contest_apply_duration_seconds",
                "Time to apply one contest",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(contest_apply_duration_seconds.clone()))?;

        Ok(Self {
            contests_applied_total,
            contests_replayed_total,
            contest_rejections_total,
            lock_timeouts_total,
            entries_opted_in_total,
            entries_opted_out_total,
            contest_apply_duration_seconds,
        })
    }
}
