//! Tracker records
//!
//! A tracker record is the per-player row kept by the persistence layer: seasonal
//! peaks and game counts for each mode. This module validates those rows and
//! converts them into [`PlayerSkillInput`] for the rating engine.

use crate::error::{SeedError, SeedResult};
use crate::types::{Mode, ModeRecord, PlayerId, PlayerSkillInput};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seasonal statistics for one mode as stored by a tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerMode {
    pub current_peak: i64,
    pub previous_peak: i64,
    pub all_time_peak: i64,
    pub current_games: i64,
    pub previous_games: i64,
}

impl TrackerMode {
    pub fn to_mode_record(&self) -> ModeRecord {
        ModeRecord::new(
            self.current_peak,
            self.current_games,
            self.previous_peak,
            self.previous_games,
        )
    }

    /// Whether any games were played in either season
    pub fn is_active(&self) -> bool {
        self.current_games > 0 || self.previous_games > 0
    }

    fn named_fields(&self, mode: Mode) -> [(String, i64); 5] {
        [
            (format!("{}CurrentPeak", mode), self.current_peak),
            (format!("{}PreviousPeak", mode), self.previous_peak),
            (format!("{}AllTimePeak", mode), self.all_time_peak),
            (format!("{}CurrentGames", mode), self.current_games),
            (format!("{}PreviousGames", mode), self.previous_games),
        ]
    }
}

/// A player's tracker row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerRecord {
    pub player_id: PlayerId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub ones: TrackerMode,
    #[serde(default)]
    pub twos: TrackerMode,
    #[serde(default)]
    pub threes: TrackerMode,
    #[serde(default = "current_timestamp")]
    pub last_updated: DateTime<Utc>,
}

/// Summary statistics over a tracker record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStats {
    pub total_games: i64,
    pub max_current_peak: i64,
    pub max_all_time_peak: i64,
    pub active_modes: usize,
    pub has_data: bool,
    pub last_updated: DateTime<Utc>,
}

impl TrackerRecord {
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            url: String::new(),
            ones: TrackerMode::default(),
            twos: TrackerMode::default(),
            threes: TrackerMode::default(),
            last_updated: current_timestamp(),
        }
    }

    pub fn mode(&self, mode: Mode) -> &TrackerMode {
        match mode {
            Mode::Ones => &self.ones,
            Mode::Twos => &self.twos,
            Mode::Threes => &self.threes,
        }
    }

    pub fn modes(&self) -> impl Iterator<Item = (Mode, &TrackerMode)> + '_ {
        Mode::ALL.into_iter().map(move |mode| (mode, self.mode(mode)))
    }

    /// Reject rows with no player id or any negative peak or game count
    pub fn validate(&self) -> SeedResult<()> {
        if self.player_id.trim().is_empty() {
            return Err(SeedError::InvalidPlayerData {
                reason: "player id is required".to_string(),
            });
        }

        for (mode, stats) in self.modes() {
            if let Some((name, value)) = stats
                .named_fields(mode)
                .into_iter()
                .find(|(_, value)| *value < 0)
            {
                return Err(SeedError::InvalidPlayerData {
                    reason: format!("{} cannot be negative: {}", name, value),
                });
            }
        }

        Ok(())
    }

    /// Seasonal peaks and game counts in the engine's input shape.
    ///
    /// All-time peaks are not part of the rating input.
    pub fn to_skill_input(&self) -> PlayerSkillInput {
        PlayerSkillInput::new(
            self.ones.to_mode_record(),
            self.twos.to_mode_record(),
            self.threes.to_mode_record(),
        )
    }

    pub fn stats(&self) -> TrackerStats {
        let total_games = self
            .modes()
            .fold(0i64, |total, (_, stats)| {
                total.saturating_add(stats.to_mode_record().total_games())
            });

        TrackerStats {
            total_games,
            max_current_peak: self
                .modes()
                .map(|(_, stats)| stats.current_peak)
                .max()
                .unwrap_or(0),
            max_all_time_peak: self
                .modes()
                .map(|(_, stats)| stats.all_time_peak)
                .max()
                .unwrap_or(0),
            active_modes: self.modes().filter(|(_, stats)| stats.is_active()).count(),
            has_data: total_games > 0,
            last_updated: self.last_updated,
        }
    }
}
