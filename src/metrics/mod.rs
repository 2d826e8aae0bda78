//! Metrics for the leaderboard engine
//!
//! This module provides Prometheus counters and histograms for entry
//! lifecycle events and contest application.

pub mod collector;

pub use collector::{EngineMetrics, MetricsCollector, MetricsTimer};
