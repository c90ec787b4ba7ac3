//! MMR to percentile conversion
//!
//! Converts a playlist MMR into the share of the ranked population below it,
//! then into a normalized 0-100 skill score and finally onto the mu scale.

use crate::config::rating::{ModeWeights, RatingConfig, SkillTransform};
use crate::rating::distribution::{RankDistributionTable, RankLookup, TierLookup};
use crate::types::{Mode, Playlist};
use crate::utils::clamp;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// Percentile reported below the lowest tier. Never exactly 0 so the power
/// transform stays well-defined.
pub const PERCENTILE_FLOOR: f64 = 0.00001;
/// Percentile reported above the highest tier
pub const PERCENTILE_CEILING: f64 = 99.99999;
pub const SKILL_FLOOR: f64 = 0.001;
pub const SKILL_CEILING: f64 = 99.999;
/// Skill assumed when no mode has usable data
pub const MEDIAN_SKILL: f64 = 50.0;

// Piecewise expansion curve
const EXPANSION_KNEE: f64 = 85.0;
const EXPANSION_COMPRESSION: f64 = 0.85;
const EXPANSION_SPAN: f64 = 15.0;
const EXPANSION_EXPONENT: f64 = 1.5;
const EXPANSION_HEADROOM: f64 = 27.75;

/// Converts MMR values into percentiles, skills and mu
#[derive(Debug, Clone)]
pub struct PercentileConverter {
    transform: SkillTransform,
    power_factor: f64,
    mu_min: f64,
    mu_max: f64,
    lookups: [OnceLock<RankLookup>; 3],
}

impl PercentileConverter {
    pub fn new(config: &RatingConfig) -> Self {
        Self {
            transform: config.skill_transform,
            power_factor: config.power_factor,
            mu_min: config.mu_min,
            mu_max: config.mu_max,
            lookups: [OnceLock::new(), OnceLock::new(), OnceLock::new()],
        }
    }

    /// Lookup index for a playlist, built on first use
    pub fn lookup(&self, playlist: Playlist) -> &RankLookup {
        self.lookups[playlist.index()].get_or_init(|| {
            debug!("Building rank lookup for {}", playlist);
            RankLookup::build(RankDistributionTable::for_playlist(playlist))
        })
    }

    /// Build every playlist's lookup index up front
    pub fn warm(&self) {
        for mode in Mode::ALL {
            self.lookup(mode.playlist());
        }
    }

    /// Percentage of the playlist's population at or below `mmr`
    pub fn mmr_to_percentile(&self, mmr: f64, playlist: Playlist) -> f64 {
        let mmr = mmr.max(0.0);
        let lookup = self.lookup(playlist);

        let range = match lookup.find(mmr) {
            TierLookup::Tier(range) => range,
            TierLookup::BelowRange => return PERCENTILE_FLOOR,
            TierLookup::AboveRange => return PERCENTILE_CEILING,
        };

        let mut percentile = lookup.cumulative_below(range.tier);
        let span = range.max_mmr - range.min_mmr;
        if span > 0.0 {
            let position = clamp((mmr - range.min_mmr) / span, 0.0, 1.0);
            percentile += position * lookup.tier_percent(range.tier);
        }

        clamp(percentile, PERCENTILE_FLOOR, PERCENTILE_CEILING)
    }

    /// Like [`Self::mmr_to_percentile`], resolving the playlist by name.
    /// Unknown names use [`Playlist::DEFAULT`].
    pub fn mmr_to_percentile_by_name(&self, mmr: f64, playlist: &str) -> f64 {
        self.mmr_to_percentile(mmr, Playlist::from_name_or_default(playlist))
    }

    /// Map a percentile onto the 0-100 skill scale
    pub fn percentile_to_normalized_skill(&self, percentile: f64) -> f64 {
        let skill = match self.transform {
            SkillTransform::PowerLaw => {
                (percentile / 100.0).powf(1.0 / self.power_factor) * 100.0
            }
            SkillTransform::PiecewiseExpansion => piecewise_expansion(percentile),
        };

        clamp(skill, SKILL_FLOOR, SKILL_CEILING)
    }

    pub fn mmr_to_normalized_skill(&self, mmr: f64, playlist: Playlist) -> f64 {
        let percentile = self.mmr_to_percentile(mmr, playlist);
        self.percentile_to_normalized_skill(percentile)
    }

    /// Linear map from the 0-100 skill scale onto `[mu_min, mu_max]`
    pub fn normalized_skill_to_mu(&self, skill: f64) -> f64 {
        let skill = clamp(skill, 0.0, 100.0);
        let mu = self.mu_min + (self.mu_max - self.mu_min) * skill / 100.0;
        clamp(mu, self.mu_min, self.mu_max)
    }

    /// Weighted mean of the skills that are present and carry a positive
    /// weight. Falls back to [`MEDIAN_SKILL`] when nothing qualifies.
    pub fn aggregate_playlist_skills(
        &self,
        skills: &BTreeMap<Mode, Option<f64>>,
        weights: &ModeWeights,
    ) -> f64 {
        let (weighted_sum, total_weight) = skills
            .iter()
            .filter_map(|(mode, skill)| {
                let weight = weights.get(*mode);
                match skill {
                    Some(skill) if weight > 0.0 => Some((skill * weight, weight)),
                    _ => None,
                }
            })
            .fold((0.0, 0.0), |(sum, total), (value, weight)| {
                (sum + value, total + weight)
            });

        if total_weight == 0.0 {
            return MEDIAN_SKILL;
        }

        weighted_sum / total_weight
    }
}

/// Compress everything below the knee, then expand the elite tail so the
/// top few percent stay separated.
fn piecewise_expansion(percentile: f64) -> f64 {
    let percentile = clamp(percentile, PERCENTILE_FLOOR, PERCENTILE_CEILING);
    if percentile < EXPANSION_KNEE {
        return percentile * EXPANSION_COMPRESSION;
    }

    let base = EXPANSION_KNEE * EXPANSION_COMPRESSION;
    let excess = (percentile - EXPANSION_KNEE) / EXPANSION_SPAN;
    let skill = base + excess.powf(EXPANSION_EXPONENT) * EXPANSION_HEADROOM;
    clamp(skill, PERCENTILE_FLOOR, PERCENTILE_CEILING)
}
