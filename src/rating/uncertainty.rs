//! Uncertainty (sigma) estimation
//!
//! Sigma is derived from six independent confidence factors, each roughly in
//! `[0.3, 1.0]`. They are multiplied together, so a single weak factor pulls
//! the result towards low confidence (high sigma).
//!
//! Factors:
//! - experience: total games played
//! - diversity: how many modes meet the games threshold, and how evenly
//! - consistency: coarse activity step (see [`UncertaintyEstimator::consistency_factor`])
//! - recency: share of games played in the current season
//! - peak performance: highest seasonal peak across modes
//! - data quality: share of non-zero raw fields

use crate::config::rating::RatingConfig;
use crate::types::PlayerSkillInput;
use crate::utils::{clamp, round_to};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Games after which experience stops adding confidence
pub const MAX_GAMES_FOR_CERTAINTY: f64 = 1000.0;
/// Below this many games the consistency factor stays at its default
pub const LOW_ACTIVITY_GAMES_THRESHOLD: i64 = 50;
/// Games a mode needs to count as active for the diversity factor.
///
/// Independent of the configurable threshold that gates MMR aggregation.
pub const DIVERSITY_MIN_GAMES: i64 = 10;

pub const MIN_FACTOR: f64 = 0.3;
pub const MAX_FACTOR: f64 = 1.0;
pub const DEFAULT_FACTOR: f64 = 0.5;
const ACTIVE_CONSISTENCY_FACTOR: f64 = 0.8;

const TOTAL_MODE_COUNT: f64 = 3.0;
const VARIANCE_PENALTY_DIVISOR: f64 = 10_000.0;
const MAX_DISTRIBUTION_PENALTY: f64 = 0.2;

const LOW_PEAK_MMR: f64 = 600.0;
const HIGH_PEAK_MMR: f64 = 1200.0;
const LOW_PEAK_FACTOR: f64 = 0.5;
const HIGH_PEAK_FACTOR: f64 = 0.9;

const MIN_DATA_QUALITY: f64 = 0.5;

/// Each factor that went into a sigma estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertaintyBreakdown {
    pub experience: f64,
    pub diversity: f64,
    pub consistency: f64,
    pub recency: f64,
    pub peak_performance: f64,
    pub data_quality: f64,
    pub combined: f64,
    pub sigma: f64,
}

/// Estimates TrueSkill sigma from activity and data quality
#[derive(Debug, Clone)]
pub struct UncertaintyEstimator {
    sigma_min: f64,
    sigma_max: f64,
}

impl UncertaintyEstimator {
    pub fn new(config: &RatingConfig) -> Self {
        Self {
            sigma_min: config.sigma_min,
            sigma_max: config.sigma_max,
        }
    }

    /// Sigma in `[sigma_min, sigma_max]`, rounded to three decimals
    pub fn estimate(&self, input: &PlayerSkillInput) -> f64 {
        self.estimate_breakdown(input).sigma
    }

    /// Sigma together with every factor behind it
    pub fn estimate_breakdown(&self, input: &PlayerSkillInput) -> UncertaintyBreakdown {
        let total_games = input.total_games();

        let experience = Self::experience_factor(total_games);
        let diversity = Self::diversity_factor(input);
        let consistency = Self::consistency_factor(total_games);
        let recency = Self::recency_factor(input);
        let peak_performance = Self::peak_performance_factor(input);
        let data_quality = Self::data_quality_factor(input);

        let combined =
            experience * diversity * consistency * recency * peak_performance * data_quality;

        let raw_sigma = self.sigma_max - combined * (self.sigma_max - self.sigma_min);
        let sigma = round_to(clamp(raw_sigma, self.sigma_min, self.sigma_max), 3);

        debug!(
            experience,
            diversity,
            consistency,
            recency,
            peak_performance,
            data_quality,
            combined,
            sigma,
            "Estimated uncertainty"
        );

        UncertaintyBreakdown {
            experience,
            diversity,
            consistency,
            recency,
            peak_performance,
            data_quality,
            combined,
            sigma,
        }
    }

    pub fn experience_factor(total_games: i64) -> f64 {
        (total_games as f64 / MAX_GAMES_FOR_CERTAINTY).min(MAX_FACTOR)
    }

    /// Share of modes with at least [`DIVERSITY_MIN_GAMES`], penalized when
    /// the game counts of those modes are uneven
    pub fn diversity_factor(input: &PlayerSkillInput) -> f64 {
        let active: Vec<f64> = input
            .iter()
            .map(|(_, record)| record.total_games())
            .filter(|games| *games >= DIVERSITY_MIN_GAMES)
            .map(|games| games as f64)
            .collect();

        if active.is_empty() {
            return MIN_FACTOR;
        }

        let mut diversity = active.len() as f64 / TOTAL_MODE_COUNT;

        if active.len() > 1 {
            let mean = active.iter().sum::<f64>() / active.len() as f64;
            let variance =
                active.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / active.len() as f64;

            let penalty = (variance / VARIANCE_PENALTY_DIVISOR).min(MAX_DISTRIBUTION_PENALTY);
            diversity *= 1.0 - penalty;
        }

        clamp(diversity, MIN_FACTOR, MAX_FACTOR)
    }

    /// Step function on total activity.
    ///
    /// A coarse stand-in for the variance of percentiles across modes.
    pub fn consistency_factor(total_games: i64) -> f64 {
        if total_games < LOW_ACTIVITY_GAMES_THRESHOLD {
            DEFAULT_FACTOR
        } else {
            ACTIVE_CONSISTENCY_FACTOR
        }
    }

    pub fn recency_factor(input: &PlayerSkillInput) -> f64 {
        let current = input.current_games();
        let total = current.saturating_add(input.previous_games());

        if total == 0 {
            return MIN_FACTOR;
        }

        let ratio = current as f64 / total as f64;
        clamp(0.5 + ratio * 0.5, MIN_FACTOR, MAX_FACTOR)
    }

    pub fn peak_performance_factor(input: &PlayerSkillInput) -> f64 {
        let max_peak = input
            .iter()
            .map(|(_, record)| record.max_peak())
            .max()
            .unwrap_or(0) as f64;

        if max_peak < LOW_PEAK_MMR {
            LOW_PEAK_FACTOR
        } else if max_peak > HIGH_PEAK_MMR {
            HIGH_PEAK_FACTOR
        } else {
            LOW_PEAK_FACTOR
                + (max_peak - LOW_PEAK_MMR) / (HIGH_PEAK_MMR - LOW_PEAK_MMR)
                    * (HIGH_PEAK_FACTOR - LOW_PEAK_FACTOR)
        }
    }

    pub fn data_quality_factor(input: &PlayerSkillInput) -> f64 {
        let (valid, total) = input
            .raw_fields()
            .fold((0usize, 0usize), |(valid, total), value| {
                (valid + usize::from(value > 0), total + 1)
            });

        (valid as f64 / total as f64).max(MIN_DATA_QUALITY)
    }
}
