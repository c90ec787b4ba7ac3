//! Metrics for the rating seeder
//!
//! Prometheus counters and histograms describing computed ratings and batch
//! runs. The CLI can dump them in text exposition format after a run.

pub mod collector;

pub use collector::{BatchMetrics, MetricsCollector, PerformanceMetrics, RatingMetrics};
