//! Rating engine
//!
//! Combines the MMR calculator and the uncertainty estimator into a single
//! TrueSkill seed (mu, sigma) per player.

use crate::config::rating::RatingConfig;
use crate::error::SeedResult;
use crate::rating::mmr::MmrCalculator;
use crate::rating::percentile::PercentileConverter;
use crate::rating::uncertainty::{UncertaintyBreakdown, UncertaintyEstimator};
use crate::types::{PlayerSkillInput, RatingResult, SkillResult};
use crate::utils::current_timestamp;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Computes initial TrueSkill ratings from per-mode MMR history
#[derive(Debug, Clone)]
pub struct RatingEngine {
    config: RatingConfig,
    converter: Arc<PercentileConverter>,
    calculator: MmrCalculator,
    estimator: UncertaintyEstimator,
}

impl RatingEngine {
    /// Create an engine, rejecting invalid configuration
    pub fn new(config: RatingConfig) -> SeedResult<Self> {
        config.validate()?;

        let converter = Arc::new(PercentileConverter::new(&config));
        converter.warm();

        let calculator = MmrCalculator::new(&config, Arc::clone(&converter));
        let estimator = UncertaintyEstimator::new(&config);

        info!(
            "Rating engine ready: mu [{}, {}], sigma [{}, {}], transform {:?}",
            config.mu_min, config.mu_max, config.sigma_min, config.sigma_max, config.skill_transform
        );

        Ok(Self {
            config,
            converter,
            calculator,
            estimator,
        })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn converter(&self) -> &PercentileConverter {
        &self.converter
    }

    pub fn calculator(&self) -> &MmrCalculator {
        &self.calculator
    }

    pub fn estimator(&self) -> &UncertaintyEstimator {
        &self.estimator
    }

    /// Compute mu and sigma for a player.
    ///
    /// Returns [`crate::error::SeedError::InvalidPlayerData`] when any MMR or
    /// game count is negative, or when the game total overflows.
    pub fn compute_rating(&self, input: &PlayerSkillInput) -> SeedResult<RatingResult> {
        self.compute_rating_with_breakdown(input).map(|(rating, _)| rating)
    }

    /// Like [`Self::compute_rating`], but invalid input yields the fallback
    /// skill result with maximum uncertainty instead of an error
    pub fn compute_rating_or_fallback(&self, input: &PlayerSkillInput) -> RatingResult {
        self.compute_rating(input).unwrap_or_else(|err| {
            warn!("Rating fell back to defaults: {}", err);
            self.fallback_rating(err.to_string())
        })
    }

    /// Rating and every uncertainty factor behind its sigma
    pub fn compute_rating_with_breakdown(
        &self,
        input: &PlayerSkillInput,
    ) -> SeedResult<(RatingResult, UncertaintyBreakdown)> {
        let skill_result = self.calculator.try_calculate(input)?;
        let breakdown = self.estimator.estimate_breakdown(input);

        debug!(
            mu = skill_result.mu,
            sigma = breakdown.sigma,
            total_games = skill_result.total_games,
            "Computed rating"
        );

        let rating = RatingResult {
            mu: skill_result.mu,
            sigma: breakdown.sigma,
            skill_result,
            computed_at: current_timestamp(),
        };
        Ok((rating, breakdown))
    }

    /// Rating assigned to players with no MMR source at all
    pub fn default_rating(&self) -> RatingResult {
        let mut skill_result = self
            .calculator
            .try_calculate(&PlayerSkillInput::default())
            .unwrap_or_else(|err| self.calculator.fallback_result(err.to_string()));
        skill_result.mu = self.config.initial_mu;

        RatingResult {
            mu: self.config.initial_mu,
            sigma: self.config.initial_sigma,
            skill_result,
            computed_at: current_timestamp(),
        }
    }

    fn fallback_rating(&self, error: String) -> RatingResult {
        let skill_result: SkillResult = self.calculator.fallback_result(error);
        RatingResult {
            mu: skill_result.mu,
            sigma: self.config.sigma_max,
            skill_result,
            computed_at: current_timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeedError;
    use crate::types::{Fallback, ModeRecord};
    use skillratings::trueskill::TrueSkillRating;

    fn production_fixture() -> PlayerSkillInput {
        PlayerSkillInput::new(
            ModeRecord::new(800, 14, 799, 37),
            ModeRecord::new(1142, 13, 1133, 60),
            ModeRecord::new(1110, 11, 1167, 42),
        )
    }

    #[test]
    fn test_production_fixture_under_legacy_curve() {
        let engine = RatingEngine::new(RatingConfig::legacy()).unwrap();
        let rating = engine.compute_rating(&production_fixture()).unwrap();

        assert!(
            (rating.mu - 1805.78).abs() <= 50.0,
            "mu {} too far from production value",
            rating.mu
        );
        assert_eq!(rating.sigma, 7.897);
        assert_eq!(rating.skill_result.total_games, 177);
    }

    #[test]
    fn test_production_fixture_under_default_curve() {
        let engine = RatingEngine::new(RatingConfig::default()).unwrap();
        let rating = engine.compute_rating(&production_fixture()).unwrap();
        assert!(rating.mu > 2100.0 && rating.mu <= 2200.0);
        assert_eq!(rating.sigma, 7.897);
    }

    #[test]
    fn test_zero_input() {
        let engine = RatingEngine::new(RatingConfig::default()).unwrap();
        let rating = engine.compute_rating(&PlayerSkillInput::default()).unwrap();
        assert_eq!(rating.skill_result.normalized_skill, 50.0);
        assert_eq!(rating.mu, 1500.0);
        assert_eq!(rating.sigma, 8.333);
    }

    #[test]
    fn test_negative_input_is_rejected() {
        let engine = RatingEngine::new(RatingConfig::default()).unwrap();
        let input = PlayerSkillInput {
            twos: ModeRecord::new(-1, 20, 0, 0),
            ..Default::default()
        };

        let err = engine.compute_rating(&input).unwrap_err();
        assert!(matches!(err, SeedError::InvalidPlayerData { .. }));

        let fallback = engine.compute_rating_or_fallback(&input);
        assert_eq!(fallback.mu, 1000.0);
        assert_eq!(fallback.sigma, 8.333);
        assert_eq!(fallback.skill_result.total_games, 0);
        assert_eq!(fallback.skill_result.fallback, Some(Fallback::DefaultValues));
        assert!(fallback.skill_result.error.is_some());
    }

    #[test]
    fn test_overflowing_game_counts_are_rejected() {
        let engine = RatingEngine::new(RatingConfig::default()).unwrap();
        let input = PlayerSkillInput {
            twos: ModeRecord::new(1500, i64::MAX, 1400, 1),
            ..Default::default()
        };

        let err = engine.compute_rating(&input).unwrap_err();
        assert!(matches!(err, SeedError::InvalidPlayerData { .. }));

        let fallback = engine.compute_rating_or_fallback(&input);
        assert!(fallback.skill_result.is_fallback());
        assert_eq!(fallback.sigma, 8.333);
    }

    #[test]
    fn test_repeated_calls_agree() {
        let engine = RatingEngine::new(RatingConfig::default()).unwrap();
        let first = engine.compute_rating(&production_fixture()).unwrap();
        let second = engine.compute_rating(&production_fixture()).unwrap();
        assert!(first.same_rating(&second));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RatingConfig {
            sigma_min: 9.0,
            ..RatingConfig::default()
        };
        let err = RatingEngine::new(config).unwrap_err();
        assert!(matches!(err, SeedError::ConfigurationError { .. }));
    }

    #[test]
    fn test_default_rating_uses_initial_values() {
        let engine = RatingEngine::new(RatingConfig::legacy()).unwrap();
        let rating = engine.default_rating();
        assert_eq!(rating.mu, 1000.0);
        assert_eq!(rating.sigma, 8.333);
        assert_eq!(rating.skill_result.total_games, 0);
    }

    #[test]
    fn test_breakdown_matches_sigma() {
        let engine = RatingEngine::new(RatingConfig::default()).unwrap();
        let (rating, breakdown) = engine
            .compute_rating_with_breakdown(&production_fixture())
            .unwrap();
        assert_eq!(rating.sigma, breakdown.sigma);
        assert_eq!(breakdown, engine.estimator().estimate_breakdown(&production_fixture()));
        assert_eq!(rating.sigma, 7.897);
        assert!(rating.same_rating(&engine.compute_rating(&production_fixture()).unwrap()));
    }

    #[test]
    fn test_trueskill_conversion() {
        let engine = RatingEngine::new(RatingConfig::default()).unwrap();
        let rating = engine.compute_rating(&production_fixture()).unwrap();
        let seed: TrueSkillRating = (&rating).into();
        assert_eq!(seed.rating, rating.mu);
        assert_eq!(seed.uncertainty, rating.sigma);
    }
}
