//! Batch rating runner
//!
//! Rates every player from a [`PlayerProvider`] and writes the results to a
//! [`RatingSink`]. Players are split into chunks that are rated on tokio's
//! blocking pool; results are reassembled in input order before storing.

use crate::batch::provider::{PlayerEntry, PlayerProvider, RatingSink, RatingSource, StoredRating};
use crate::error::{Result, SeedError};
use crate::metrics::MetricsCollector;
use crate::rating::RatingEngine;
use crate::types::{PlayerId, RatingResult};
use crate::utils::{current_timestamp, generate_run_id};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default number of players rated per blocking task
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// A player that could not be rated from tracker data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchError {
    pub player_id: PlayerId,
    pub name: String,
    pub error: String,
}

/// Summary of one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub run_id: Uuid,
    pub processed: usize,
    /// Ratings computed from tracker data
    pub tracker_based: usize,
    /// Players that kept an existing rating or received the initial one
    pub default_count: usize,
    /// Ratings the sink reported as written
    pub stored: usize,
    pub errors: Vec<BatchError>,
    /// Ratings in provider order
    pub ratings: Vec<StoredRating>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl BatchReport {
    fn empty(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            processed: 0,
            tracker_based: 0,
            default_count: 0,
            stored: 0,
            errors: Vec::new(),
            ratings: Vec::new(),
            started_at,
            completed_at: current_timestamp(),
        }
    }
}

struct PlayerOutcome {
    rating: StoredRating,
    computed: Option<(RatingResult, Duration)>,
    error: Option<BatchError>,
}

/// Rates a provider's players and stores the results
pub struct BatchRatingRunner {
    engine: Arc<RatingEngine>,
    provider: Arc<dyn PlayerProvider>,
    sink: Arc<dyn RatingSink>,
    chunk_size: usize,
    metrics: Option<Arc<MetricsCollector>>,
}

impl BatchRatingRunner {
    pub fn new(
        engine: Arc<RatingEngine>,
        provider: Arc<dyn PlayerProvider>,
        sink: Arc<dyn RatingSink>,
    ) -> Self {
        Self {
            engine,
            provider,
            sink,
            chunk_size: DEFAULT_CHUNK_SIZE,
            metrics: None,
        }
    }

    /// Players per blocking task; zero is treated as one
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Fetch, rate and store every player.
    ///
    /// Per-player failures are collected in the report. A provider or sink
    /// failure aborts the run.
    pub async fn run(&self) -> Result<BatchReport> {
        let run_id = generate_run_id();
        let started_at = current_timestamp();
        let timer = Instant::now();

        let players = self
            .provider
            .fetch_players()
            .await
            .context("Failed to fetch players")?;

        if players.is_empty() {
            info!("Batch {}: no players to rate", run_id);
            return Ok(BatchReport::empty(run_id, started_at));
        }

        info!("Batch {}: rating {} players", run_id, players.len());

        let outcomes = self.rate_players(players).await?;
        let mut report = self.build_report(run_id, started_at, outcomes);

        report.stored = self
            .sink
            .store_ratings(report.ratings.clone())
            .await
            .context("Failed to store ratings")?;
        report.completed_at = current_timestamp();

        if let Some(metrics) = &self.metrics {
            metrics.record_batch(&report, timer.elapsed());
        }

        report_results(&report);
        Ok(report)
    }

    async fn rate_players(&self, players: Vec<PlayerEntry>) -> Result<Vec<PlayerOutcome>> {
        let mut tasks = JoinSet::new();
        let mut remaining = players.into_iter();
        let mut chunk_count = 0usize;

        loop {
            let chunk: Vec<PlayerEntry> = remaining.by_ref().take(self.chunk_size).collect();
            if chunk.is_empty() {
                break;
            }

            let engine = Arc::clone(&self.engine);
            let index = chunk_count;
            tasks.spawn_blocking(move || (index, rate_chunk(&engine, chunk)));
            chunk_count += 1;
        }

        debug!("Rating spread over {} chunks", chunk_count);

        let mut chunks = Vec::with_capacity(chunk_count);
        while let Some(joined) = tasks.join_next().await {
            let chunk = joined.map_err(|e| SeedError::InternalError {
                message: format!("Rating task failed: {}", e),
            })?;
            chunks.push(chunk);
        }
        chunks.sort_by_key(|(index, _)| *index);

        Ok(chunks
            .into_iter()
            .flat_map(|(_, outcomes)| outcomes)
            .collect())
    }

    fn build_report(
        &self,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        outcomes: Vec<PlayerOutcome>,
    ) -> BatchReport {
        let mut report = BatchReport::empty(run_id, started_at);
        report.processed = outcomes.len();

        for outcome in outcomes {
            match &outcome.computed {
                Some((result, duration)) => {
                    report.tracker_based += 1;
                    if let Some(metrics) = &self.metrics {
                        metrics.record_rating(result, *duration);
                    }
                }
                None => {
                    report.default_count += 1;
                    if let Some(metrics) = &self.metrics {
                        metrics.record_uncomputed(outcome.rating.source);
                    }
                }
            }

            if let Some(error) = outcome.error {
                if let Some(metrics) = &self.metrics {
                    metrics.record_player_error();
                }
                report.errors.push(error);
            }

            report.ratings.push(outcome.rating);
        }

        report
    }
}

fn rate_chunk(engine: &RatingEngine, players: Vec<PlayerEntry>) -> Vec<PlayerOutcome> {
    players
        .into_iter()
        .map(|player| rate_player(engine, player))
        .collect()
}

fn rate_player(engine: &RatingEngine, player: PlayerEntry) -> PlayerOutcome {
    let Some(tracker) = &player.tracker else {
        return keep_rating(engine, &player, None);
    };

    let started = Instant::now();
    let computed = tracker
        .validate()
        .and_then(|()| engine.compute_rating(&tracker.to_skill_input()));

    match computed {
        Ok(result) => {
            debug!(
                "Calculated rating for {}: mu={:.1}, sigma={:.3}",
                player.display_name(),
                result.mu,
                result.sigma
            );
            PlayerOutcome {
                rating: StoredRating {
                    player_id: player.player_id.clone(),
                    mu: result.mu,
                    sigma: result.sigma,
                    source: RatingSource::Tracker,
                    updated_at: result.computed_at,
                },
                computed: Some((result, started.elapsed())),
                error: None,
            }
        }
        Err(err) => {
            warn!(
                "Failed to calculate rating for {} ({}): {}",
                player.display_name(),
                player.player_id,
                err
            );
            let error = BatchError {
                player_id: player.player_id.clone(),
                name: player.name.clone(),
                error: err.to_string(),
            };
            keep_rating(engine, &player, Some(error))
        }
    }
}

/// Carry over the player's existing rating, or assign the initial one
fn keep_rating(
    engine: &RatingEngine,
    player: &PlayerEntry,
    error: Option<BatchError>,
) -> PlayerOutcome {
    let (mu, sigma, source) = match player.existing_rating {
        Some(existing) => (existing.rating, existing.uncertainty, RatingSource::Existing),
        None => {
            let default = engine.default_rating();
            (default.mu, default.sigma, RatingSource::Default)
        }
    };

    debug!(
        "Keeping {} rating for {}: mu={:.1}",
        source.as_str(),
        player.display_name(),
        mu
    );

    PlayerOutcome {
        rating: StoredRating {
            player_id: player.player_id.clone(),
            mu,
            sigma,
            source,
            updated_at: current_timestamp(),
        },
        computed: None,
        error,
    }
}

fn report_results(report: &BatchReport) {
    info!(
        "Batch {} complete: processed {} players, {} from trackers, {} kept or defaulted, {} stored",
        report.run_id, report.processed, report.tracker_based, report.default_count, report.stored
    );

    if !report.errors.is_empty() {
        warn!(
            "Batch {}: {} players could not be rated",
            report.run_id,
            report.errors.len()
        );
        for error in &report.errors {
            warn!("  - {} ({}): {}", error.name, error.player_id, error.error);
        }
    }
}
