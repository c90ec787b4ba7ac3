//! Percentile-based MMR calculator
//!
//! Pools each mode's two seasons into an effective MMR, converts qualifying
//! modes to normalized skill and aggregates them into a single mu.

use crate::config::rating::{ModeWeights, RatingConfig};
use crate::error::SeedResult;
use crate::rating::percentile::{PercentileConverter, MEDIAN_SKILL};
use crate::types::{Fallback, Mode, ModeBreakdown, PlayerSkillInput, SkillResult};
use crate::utils::round_to;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Skill reported alongside a validation failure
pub const FALLBACK_SKILL: f64 = MEDIAN_SKILL;
/// Mu reported alongside a validation failure
pub const FALLBACK_MU: f64 = 1000.0;

/// Turns per-mode MMR records into a normalized skill and mu
#[derive(Debug, Clone)]
pub struct MmrCalculator {
    converter: Arc<PercentileConverter>,
    weights: ModeWeights,
    min_games_threshold: i64,
}

impl MmrCalculator {
    pub fn new(config: &RatingConfig, converter: Arc<PercentileConverter>) -> Self {
        Self {
            converter,
            weights: config.weights,
            min_games_threshold: config.min_games_threshold,
        }
    }

    /// Calculate skill, substituting the documented defaults on invalid input.
    ///
    /// A substituted result carries the error text and
    /// [`Fallback::DefaultValues`]; callers must check
    /// [`SkillResult::is_fallback`] to detect it.
    pub fn calculate(&self, input: &PlayerSkillInput) -> SkillResult {
        self.try_calculate(input).unwrap_or_else(|err| {
            warn!("Player data rejected, using default skill: {}", err);
            self.fallback_result(err.to_string())
        })
    }

    /// Calculate skill, returning an error for invalid input
    pub fn try_calculate(&self, input: &PlayerSkillInput) -> SeedResult<SkillResult> {
        input.validate()?;

        let mut breakdown = BTreeMap::new();
        let mut skills = BTreeMap::new();

        for (mode, record) in input.iter() {
            let games = record.total_games();
            let effective_mmr = record.effective_mmr();

            let normalized_skill = if games >= self.min_games_threshold && effective_mmr > 0.0 {
                Some(
                    self.converter
                        .mmr_to_normalized_skill(effective_mmr, mode.playlist()),
                )
            } else {
                None
            };

            skills.insert(mode, normalized_skill);
            breakdown.insert(
                mode,
                ModeBreakdown {
                    effective_mmr,
                    normalized_skill,
                    games,
                },
            );
        }

        let total_games = input.total_games();
        if total_games == 0 {
            debug!("No games recorded in any mode, assuming median skill");
        }

        let aggregated = self
            .converter
            .aggregate_playlist_skills(&skills, &self.weights);
        let mu = self.converter.normalized_skill_to_mu(aggregated);

        debug!(
            "Aggregated skill {:.2} -> mu {:.2} from {} games",
            aggregated, mu, total_games
        );

        Ok(SkillResult {
            normalized_skill: round_to(aggregated, 2),
            mu: round_to(mu, 2),
            total_games,
            breakdown,
            weights: self.weights.to_map(),
            error: None,
            fallback: None,
        })
    }

    /// Sentinel result used when input fails validation
    pub fn fallback_result(&self, error: String) -> SkillResult {
        let breakdown = Mode::ALL
            .iter()
            .map(|&mode| {
                (
                    mode,
                    ModeBreakdown {
                        effective_mmr: 0.0,
                        normalized_skill: None,
                        games: 0,
                    },
                )
            })
            .collect();

        SkillResult {
            normalized_skill: FALLBACK_SKILL,
            mu: FALLBACK_MU,
            total_games: 0,
            breakdown,
            weights: self.weights.to_map(),
            error: Some(error),
            fallback: Some(Fallback::DefaultValues),
        }
    }
}
