//! Metrics collection using Prometheus
//!
//! This module provides metrics for the rating seeder: how many ratings were
//! computed and from which source, how often input fell back to defaults, the
//! resulting mu/sigma distribution and batch timings.

use crate::batch::provider::RatingSource;
use crate::batch::runner::BatchReport;
use crate::types::RatingResult;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the rating seeder
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    rating_metrics: RatingMetrics,

    batch_metrics: BatchMetrics,

    performance_metrics: PerformanceMetrics,
}

/// Rating outcome metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Ratings produced, by source
    pub ratings_total: IntCounterVec,

    /// Inputs rejected and replaced by fallback values
    pub fallbacks_total: IntCounter,

    /// Distribution of computed mu
    pub mu_distribution: Histogram,

    /// Distribution of computed sigma
    pub sigma_distribution: Histogram,
}

/// Batch run metrics
#[derive(Clone)]
pub struct BatchMetrics {
    pub runs_total: IntCounter,

    /// Players whose rating could not be computed
    pub player_errors_total: IntCounter,

    /// Players processed in the most recent run
    pub last_run_players: IntGauge,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Single rating calculation time
    pub rating_calculation_duration: Histogram,

    /// Whole batch run time
    pub batch_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let rating_metrics = RatingMetrics::new(&registry)?;
        let batch_metrics = BatchMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            rating_metrics,
            batch_metrics,
            performance_metrics,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn rating(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    pub fn batch(&self) -> &BatchMetrics {
        &self.batch_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a computed rating
    pub fn record_rating(&self, result: &RatingResult, duration: Duration) {
        self.rating_metrics
            .ratings_total
            .with_label_values(&[RatingSource::Tracker.as_str()])
            .inc();

        if result.skill_result.is_fallback() {
            self.rating_metrics.fallbacks_total.inc();
        }

        self.rating_metrics.mu_distribution.observe(result.mu);
        self.rating_metrics.sigma_distribution.observe(result.sigma);

        self.performance_metrics
            .rating_calculation_duration
            .observe(duration.as_secs_f64());
    }

    /// Record a rating that was carried over or defaulted rather than computed
    pub fn record_uncomputed(&self, source: RatingSource) {
        self.rating_metrics
            .ratings_total
            .with_label_values(&[source.as_str()])
            .inc();
    }

    /// Record a player whose input was rejected and who received a kept or
    /// default rating in its place
    pub fn record_player_error(&self) {
        self.batch_metrics.player_errors_total.inc();
        self.rating_metrics.fallbacks_total.inc();
    }

    /// Record the outcome of a batch run
    pub fn record_batch(&self, report: &BatchReport, duration: Duration) {
        self.batch_metrics.runs_total.inc();
        self.batch_metrics
            .last_run_players
            .set(report.processed as i64);
        self.performance_metrics
            .batch_duration
            .observe(duration.as_secs_f64());
    }

    /// Current metrics in Prometheus text exposition format
    pub fn gather_text(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();

        encoder
            .encode_to_string(&metric_families)
            .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let ratings_total = IntCounterVec::new(
            Opts::new("skill_seed_ratings_total", "Ratings produced by source"),
            &["source"],
        )?;
        registry.register(Box::new(ratings_total.clone()))?;

        let fallbacks_total = IntCounter::new(
            "skill_seed_fallbacks_total",
            "Ratings that fell back to default values",
        )?;
        registry.register(Box::new(fallbacks_total.clone()))?;

        let mu_distribution = Histogram::with_opts(
            HistogramOpts::new("skill_seed_mu", "Distribution of computed mu").buckets(vec![
                800.0, 1000.0, 1200.0, 1400.0, 1600.0, 1800.0, 2000.0, 2200.0,
            ]),
        )?;
        registry.register(Box::new(mu_distribution.clone()))?;

        let sigma_distribution = Histogram::with_opts(
            HistogramOpts::new("skill_seed_sigma", "Distribution of computed sigma")
                .buckets(vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 8.5]),
        )?;
        registry.register(Box::new(sigma_distribution.clone()))?;

        Ok(Self {
            ratings_total,
            fallbacks_total,
            mu_distribution,
            sigma_distribution,
        })
    }
}

impl BatchMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let runs_total = IntCounter::new("skill_seed_batch_runs_total", "Batch runs completed")?;
        registry.register(Box::new(runs_total.clone()))?;

        let player_errors_total = IntCounter::new(
            "skill_seed_batch_player_errors_total",
            "Players that could not be rated",
        )?;
        registry.register(Box::new(player_errors_total.clone()))?;

        let last_run_players = IntGauge::new(
            "skill_seed_batch_last_run_players",
            "Players processed in the most recent batch",
        )?;
        registry.register(Box::new(last_run_players.clone()))?;

        Ok(Self {
            runs_total,
            player_errors_total,
            last_run_players,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rating_calculation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "skill_seed_rating_calculation_duration_seconds",
                "Rating calculation time",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01, 0.05]),
        )?;
        registry.register(Box::new(rating_calculation_duration.clone()))?;

        let batch_duration = Histogram::with_opts(
            HistogramOpts::new("skill_seed_batch_duration_seconds", "Batch run time")
                .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
        )?;
        registry.register(Box::new(batch_duration.clone()))?;

        Ok(Self {
            rating_calculation_duration,
            batch_duration,
        })
    }
}
