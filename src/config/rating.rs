//! Rating system configuration
//!
//! Every constant the seeding pipeline depends on lives here so that it can
//! be injected by the caller. Defaults reproduce the production settings.

use crate::error::{SeedError, SeedResult};
use crate::types::Mode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Curve used to turn a population percentile into a 0-100 skill score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTransform {
    /// `(percentile / 100) ^ (1 / power_factor) * 100`
    PowerLaw,
    /// Linear compression below the 85th percentile, power expansion above it
    PiecewiseExpansion,
}

/// Aggregation weight for each mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeWeights {
    pub ones: f64,
    pub twos: f64,
    pub threes: f64,
}

impl Default for ModeWeights {
    fn default() -> Self {
        Self {
            ones: 1.0,
            twos: 1.5, // primary competitive mode
            threes: 1.2,
        }
    }
}

impl ModeWeights {
    pub fn get(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Ones => self.ones,
            Mode::Twos => self.twos,
            Mode::Threes => self.threes,
        }
    }

    pub fn to_map(&self) -> BTreeMap<Mode, f64> {
        Mode::ALL.iter().map(|&mode| (mode, self.get(mode))).collect()
    }
}

/// Parameters for the percentile seeding pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Lowest sigma (most confident)
    pub sigma_min: f64,
    /// Highest sigma (least confident)
    pub sigma_max: f64,
    /// Lower end of the mu scale
    pub mu_min: f64,
    /// Upper end of the mu scale
    pub mu_max: f64,
    /// Exponent divisor for [`SkillTransform::PowerLaw`]
    pub power_factor: f64,
    pub skill_transform: SkillTransform,
    /// Games (both seasons) required before a mode counts towards the rating
    pub min_games_threshold: i64,
    pub weights: ModeWeights,
    /// Rating handed to players with no tracker data at all
    pub initial_mu: f64,
    pub initial_sigma: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            sigma_min: 2.5,
            sigma_max: 8.333,
            mu_min: 800.0,
            mu_max: 2200.0,
            power_factor: 1.5,
            skill_transform: SkillTransform::PowerLaw,
            min_games_threshold: 10,
            weights: ModeWeights::default(),
            initial_mu: 1500.0,
            initial_sigma: 8.333,
        }
    }
}

impl RatingConfig {
    /// Piecewise expansion curve on a 0-2000 mu scale, as used in production
    pub fn legacy() -> Self {
        Self {
            mu_min: 0.0,
            mu_max: 2000.0,
            skill_transform: SkillTransform::PiecewiseExpansion,
            initial_mu: 1000.0,
            ..Self::default()
        }
    }

    /// Midpoint of the mu scale, i.e. the mu of a median player
    pub fn mu_midpoint(&self) -> f64 {
        (self.mu_min + self.mu_max) / 2.0
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> SeedResult<()> {
        let scalars = [
            ("sigma_min", self.sigma_min),
            ("sigma_max", self.sigma_max),
            ("mu_min", self.mu_min),
            ("mu_max", self.mu_max),
            ("initial_mu", self.initial_mu),
            ("initial_sigma", self.initial_sigma),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, value)| !value.is_finite()) {
            return Err(SeedError::ConfigurationError {
                message: format!("{} must be a finite number", name),
            });
        }

        if self.sigma_min <= 0.0 {
            return Err(config_error("sigma_min must be positive"));
        }

        if self.sigma_min >= self.sigma_max {
            return Err(config_error("sigma_min must be below sigma_max"));
        }

        if self.mu_min >= self.mu_max {
            return Err(config_error("mu_min must be below mu_max"));
        }

        if self.power_factor <= 0.0 || !self.power_factor.is_finite() {
            return Err(config_error("power_factor must be a positive number"));
        }

        if self.min_games_threshold < 0 {
            return Err(config_error("min_games_threshold cannot be negative"));
        }

        let weights = [self.weights.ones, self.weights.twos, self.weights.threes];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(config_error("mode weights must be non-negative"));
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(config_error("at least one mode weight must be positive"));
        }

        if self.initial_sigma <= 0.0 {
            return Err(config_error("initial_sigma must be positive"));
        }

        Ok(())
    }
}

fn config_error(message: &str) -> SeedError {
    SeedError::ConfigurationError {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_config_default() {
        let config = RatingConfig::default();
        assert_eq!(config.sigma_min, 2.5);
        assert_eq!(config.sigma_max, 8.333);
        assert_eq!(config.mu_midpoint(), 1500.0);
        assert_eq!(config.weights.get(Mode::Twos), 1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rating_config_validation() {
        let mut config = RatingConfig::default();
        config.sigma_min = 9.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.mu_max = config.mu_min;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.power_factor = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.weights = ModeWeights {
            ones: 0.0,
            twos: 0.0,
            threes: 0.0,
        };
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.weights.ones = -1.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.min_games_threshold = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let cases: [(&str, fn(&mut RatingConfig, f64)); 6] = [
            ("sigma_min", |c, v| c.sigma_min = v),
            ("sigma_max", |c, v| c.sigma_max = v),
            ("mu_min", |c, v| c.mu_min = v),
            ("mu_max", |c, v| c.mu_max = v),
            ("initial_mu", |c, v| c.initial_mu = v),
            ("initial_sigma", |c, v| c.initial_sigma = v),
        ];

        for (name, set) in cases {
            for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                let mut config = RatingConfig::default();
                set(&mut config, value);
                let err = config.validate().unwrap_err();
                assert!(
                    err.to_string().contains(name),
                    "{} = {} gave: {}",
                    name,
                    value,
                    err
                );
            }
        }
    }

    #[test]
    fn test_non_finite_toml_rejected() {
        let config: RatingConfig = toml::from_str("mu_max = inf").unwrap();
        assert!(config.validate().is_err());

        let config: RatingConfig = toml::from_str("sigma_min = nan").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_legacy_preset() {
        let legacy = RatingConfig::legacy();
        assert_eq!(legacy.skill_transform, SkillTransform::PiecewiseExpansion);
        assert_eq!(legacy.mu_midpoint(), 1000.0);
        assert!(legacy.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RatingConfig = toml::from_str(
            r#"
            sigma_max = 9.0
            skill_transform = "piecewise_expansion"

            [weights]
            ones = 0.5
            twos = 2.0
            threes = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(config.sigma_max, 9.0);
        assert_eq!(config.sigma_min, 2.5);
        assert_eq!(config.weights.twos, 2.0);
        assert_eq!(config.skill_transform, SkillTransform::PiecewiseExpansion);
    }
}
