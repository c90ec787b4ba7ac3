//! Common types used throughout the rating seeder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillratings::trueskill::TrueSkillRating;
use std::collections::BTreeMap;

/// Unique identifier for players
pub type PlayerId = String;

/// Game mode a player has statistics for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Ones,
    Twos,
    Threes,
}

impl Mode {
    /// All modes in canonical order
    pub const ALL: [Mode; 3] = [Mode::Ones, Mode::Twos, Mode::Threes];

    /// Ranked playlist whose rank distribution describes this mode
    pub fn playlist(self) -> Playlist {
        match self {
            Mode::Ones => Playlist::SoloDuel,
            Mode::Twos => Playlist::Doubles,
            Mode::Threes => Playlist::Standard,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Ones => "ones",
            Mode::Twos => "twos",
            Mode::Threes => "threes",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ranked playlist with its own rank distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Playlist {
    SoloDuel,
    Doubles,
    Standard,
}

impl Playlist {
    /// Playlist used when a name cannot be resolved
    pub const DEFAULT: Playlist = Playlist::Doubles;

    /// Resolve a playlist from its name or from the matching mode name
    pub fn from_name(name: &str) -> Option<Playlist> {
        match name {
            "soloDuel" | "ones" => Some(Playlist::SoloDuel),
            "doubles" | "twos" => Some(Playlist::Doubles),
            "standard" | "threes" => Some(Playlist::Standard),
            _ => None,
        }
    }

    /// Resolve a playlist, falling back to [`Playlist::DEFAULT`] for unknown names
    pub fn from_name_or_default(name: &str) -> Playlist {
        Self::from_name(name).unwrap_or(Self::DEFAULT)
    }

    /// Stable index used for per-playlist caches
    pub(crate) fn index(self) -> usize {
        match self {
            Playlist::SoloDuel => 0,
            Playlist::Doubles => 1,
            Playlist::Standard => 2,
        }
    }
}

impl std::fmt::Display for Playlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Playlist::SoloDuel => write!(f, "soloDuel"),
            Playlist::Doubles => write!(f, "doubles"),
            Playlist::Standard => write!(f, "standard"),
        }
    }
}

/// One mode's two-season snapshot.
///
/// Values are signed so that negative input from a collaborator can be
/// represented and rejected rather than silently clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeRecord {
    pub current_mmr: i64,
    pub current_games: i64,
    pub previous_mmr: i64,
    pub previous_games: i64,
}

impl ModeRecord {
    pub fn new(current_mmr: i64, current_games: i64, previous_mmr: i64, previous_games: i64) -> Self {
        Self {
            current_mmr,
            current_games,
            previous_mmr,
            previous_games,
        }
    }

    /// Games across both seasons, saturating at `i64::MAX`
    pub fn total_games(&self) -> i64 {
        self.current_games.saturating_add(self.previous_games)
    }

    /// Games across both seasons, `None` on overflow
    pub fn checked_total_games(&self) -> Option<i64> {
        self.current_games.checked_add(self.previous_games)
    }

    /// Highest seasonal peak recorded for this mode
    pub fn max_peak(&self) -> i64 {
        self.current_mmr.max(self.previous_mmr)
    }

    /// Season-weighted effective MMR; 0 when no games were played
    pub fn effective_mmr(&self) -> f64 {
        let total = self.total_games();
        if total <= 0 {
            return 0.0;
        }

        let weighted = self.current_mmr as f64 * self.current_games as f64
            + self.previous_mmr as f64 * self.previous_games as f64;
        weighted / total as f64
    }

    /// Raw fields in (peak, games) order for current then previous season
    pub fn raw_fields(&self) -> [i64; 4] {
        [
            self.current_mmr,
            self.current_games,
            self.previous_mmr,
            self.previous_games,
        ]
    }
}

/// Per-mode statistics for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSkillInput {
    pub ones: ModeRecord,
    pub twos: ModeRecord,
    pub threes: ModeRecord,
}

impl PlayerSkillInput {
    pub fn new(ones: ModeRecord, twos: ModeRecord, threes: ModeRecord) -> Self {
        Self { ones, twos, threes }
    }

    /// Record for a single mode
    pub fn get(&self, mode: Mode) -> &ModeRecord {
        match mode {
            Mode::Ones => &self.ones,
            Mode::Twos => &self.twos,
            Mode::Threes => &self.threes,
        }
    }

    /// Iterate over (mode, record) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Mode, &ModeRecord)> + '_ {
        Mode::ALL.into_iter().map(move |mode| (mode, self.get(mode)))
    }

    /// Unweighted sum of games across all modes and seasons.
    ///
    /// Saturates rather than overflowing; [`Self::validate`] rejects input
    /// whose true total does not fit.
    pub fn total_games(&self) -> i64 {
        self.iter()
            .fold(0i64, |total, (_, record)| total.saturating_add(record.total_games()))
    }

    pub fn current_games(&self) -> i64 {
        self.iter()
            .fold(0i64, |total, (_, record)| total.saturating_add(record.current_games))
    }

    pub fn previous_games(&self) -> i64 {
        self.iter()
            .fold(0i64, |total, (_, record)| total.saturating_add(record.previous_games))
    }

    /// Total games, `None` when the sum does not fit in an `i64`
    pub fn checked_total_games(&self) -> Option<i64> {
        self.iter().try_fold(0i64, |total, (_, record)| {
            total.checked_add(record.checked_total_games()?)
        })
    }

    /// All twelve raw numeric fields
    pub fn raw_fields(&self) -> impl Iterator<Item = i64> + '_ {
        self.iter().flat_map(|(_, record)| record.raw_fields())
    }

    /// Reject negative MMR or game counts, and game totals that overflow
    pub fn validate(&self) -> crate::error::SeedResult<()> {
        if self
            .iter()
            .any(|(_, r)| r.current_games < 0 || r.previous_games < 0)
        {
            return Err(crate::error::SeedError::InvalidPlayerData {
                reason: "games played cannot be negative".to_string(),
            });
        }

        if self
            .iter()
            .any(|(_, r)| r.current_mmr < 0 || r.previous_mmr < 0)
        {
            return Err(crate::error::SeedError::InvalidPlayerData {
                reason: "MMR values cannot be negative".to_string(),
            });
        }

        if self.checked_total_games().is_none() {
            return Err(crate::error::SeedError::InvalidPlayerData {
                reason: "total games played is out of range".to_string(),
            });
        }

        Ok(())
    }
}

/// Marker set on a result that carries substituted values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    DefaultValues,
}

/// Calculation breakdown for a single mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeBreakdown {
    pub effective_mmr: f64,
    /// `None` when the mode did not qualify for aggregation
    pub normalized_skill: Option<f64>,
    pub games: i64,
}

/// Output of the MMR calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResult {
    pub normalized_skill: f64,
    pub mu: f64,
    pub total_games: i64,
    pub breakdown: BTreeMap<Mode, ModeBreakdown>,
    pub weights: BTreeMap<Mode, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

impl SkillResult {
    /// Whether callers received substituted default values
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Final seeded rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResult {
    pub mu: f64,
    pub sigma: f64,
    pub skill_result: SkillResult,
    pub computed_at: DateTime<Utc>,
}

impl RatingResult {
    /// Compare everything except the computation timestamp
    pub fn same_rating(&self, other: &RatingResult) -> bool {
        self.mu == other.mu && self.sigma == other.sigma && self.skill_result == other.skill_result
    }
}

impl From<&RatingResult> for TrueSkillRating {
    fn from(result: &RatingResult) -> Self {
        Self {
            rating: result.mu,
            uncertainty: result.sigma,
        }
    }
}

impl From<RatingResult> for TrueSkillRating {
    fn from(result: RatingResult) -> Self {
        (&result).into()
    }
}
