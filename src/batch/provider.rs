//! Player source and rating sink interfaces
//!
//! The batch runner never talks to a store directly. It reads players through a
//! [`PlayerProvider`] and writes ratings through a [`RatingSink`]; in-memory
//! implementations are provided for tests and the CLI.

use crate::error::SeedError;
use crate::tracker::TrackerRecord;
use crate::types::PlayerId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillratings::trueskill::TrueSkillRating;
use std::collections::HashMap;
use std::sync::RwLock;

/// A player to be rated, with whatever data the store holds for them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: String,
    /// Rating already on record, kept when no tracker is available
    #[serde(default)]
    pub existing_rating: Option<TrueSkillRating>,
    #[serde(default)]
    pub tracker: Option<TrackerRecord>,
}

impl PlayerEntry {
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            name: String::new(),
            existing_rating: None,
            tracker: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tracker(mut self, tracker: TrackerRecord) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn with_existing_rating(mut self, rating: TrueSkillRating) -> Self {
        self.existing_rating = Some(rating);
        self
    }

    /// Name for log lines, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.player_id
        } else {
            &self.name
        }
    }
}

impl From<TrackerRecord> for PlayerEntry {
    fn from(tracker: TrackerRecord) -> Self {
        Self::new(tracker.player_id.clone()).with_tracker(tracker)
    }
}

/// Where a stored rating came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingSource {
    /// Computed from tracker data
    Tracker,
    /// Previously stored rating carried over
    Existing,
    /// Configured initial rating
    Default,
}

impl RatingSource {
    pub fn as_str(self) -> &'static str {
        match self {
            RatingSource::Tracker => "tracker",
            RatingSource::Existing => "existing",
            RatingSource::Default => "default",
        }
    }
}

/// A rating ready to be persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRating {
    pub player_id: PlayerId,
    pub mu: f64,
    pub sigma: f64,
    pub source: RatingSource,
    pub updated_at: DateTime<Utc>,
}

impl From<&StoredRating> for TrueSkillRating {
    fn from(stored: &StoredRating) -> Self {
        Self {
            rating: stored.mu,
            uncertainty: stored.sigma,
        }
    }
}

/// Source of players for a batch run
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerProvider: Send + Sync {
    /// Every player that should receive a rating
    async fn fetch_players(&self) -> crate::error::Result<Vec<PlayerEntry>>;
}

/// Destination for computed ratings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingSink: Send + Sync {
    /// Persist ratings, returning how many were written
    async fn store_ratings(&self, ratings: Vec<StoredRating>) -> crate::error::Result<usize>;
}

/// Player provider backed by a fixed list
#[derive(Debug, Default)]
pub struct InMemoryPlayerProvider {
    players: RwLock<Vec<PlayerEntry>>,
}

impl InMemoryPlayerProvider {
    pub fn new(players: Vec<PlayerEntry>) -> Self {
        Self {
            players: RwLock::new(players),
        }
    }

    pub fn from_trackers(trackers: Vec<TrackerRecord>) -> Self {
        Self::new(trackers.into_iter().map(PlayerEntry::from).collect())
    }

    pub fn add_player(&self, player: PlayerEntry) -> crate::error::Result<()> {
        let mut players = self.players.write().map_err(|_| SeedError::StorageError {
            message: "Failed to acquire players write lock".to_string(),
        })?;
        players.push(player);
        Ok(())
    }
}

#[async_trait]
impl PlayerProvider for InMemoryPlayerProvider {
    async fn fetch_players(&self) -> crate::error::Result<Vec<PlayerEntry>> {
        let players = self.players.read().map_err(|_| SeedError::StorageError {
            message: "Failed to acquire players read lock".to_string(),
        })?;
        Ok(players.clone())
    }
}

/// Rating sink that keeps the latest rating per player in memory
#[derive(Debug, Default)]
pub struct InMemoryRatingSink {
    ratings: RwLock<HashMap<PlayerId, StoredRating>>,
}

impl InMemoryRatingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player_id: &str) -> Option<StoredRating> {
        self.ratings
            .read()
            .ok()
            .and_then(|ratings| ratings.get(player_id).cloned())
    }

    pub fn len(&self) -> usize {
        self.ratings.read().map(|ratings| ratings.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored ratings ordered by player id
    pub fn all(&self) -> Vec<StoredRating> {
        let mut all: Vec<StoredRating> = self
            .ratings
            .read()
            .map(|ratings| ratings.values().cloned().collect())
            .unwrap_or_default();
        all.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        all
    }
}

#[async_trait]
impl RatingSink for InMemoryRatingSink {
    async fn store_ratings(&self, ratings: Vec<StoredRating>) -> crate::error::Result<usize> {
        let mut stored = self.ratings.write().map_err(|_| SeedError::StorageError {
            message: "Failed to acquire ratings write lock".to_string(),
        })?;

        let count = ratings.len();
        for rating in ratings {
            stored.insert(rating.player_id.clone(), rating);
        }

        Ok(count)
    }
}
