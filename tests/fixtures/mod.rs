//! Test fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use skill_seed::batch::{PlayerEntry, RatingSink, StoredRating};
use skill_seed::error::Result;
use skill_seed::tracker::{TrackerMode, TrackerRecord};
use skill_seed::types::{ModeRecord, PlayerSkillInput};
use std::sync::{Arc, Mutex};

/// Player whose production rating was 1805.78 under the piecewise curve
pub fn production_fixture() -> PlayerSkillInput {
    PlayerSkillInput::new(
        ModeRecord::new(800, 14, 799, 37),
        ModeRecord::new(1142, 13, 1133, 60),
        ModeRecord::new(1110, 11, 1167, 42),
    )
}

/// High-volume 2v2 player with a short 3v3 history
pub fn doubles_specialist() -> PlayerSkillInput {
    PlayerSkillInput::new(
        ModeRecord::new(1365, 351, 1311, 931),
        ModeRecord::new(1801, 728, 1885, 772),
        ModeRecord::new(1398, 5, 1444, 1),
    )
}

/// Low-ranked player active in two modes
pub fn low_rank_player() -> PlayerSkillInput {
    PlayerSkillInput {
        twos: ModeRecord::new(500, 25, 450, 18),
        threes: ModeRecord::new(520, 12, 0, 0),
        ..Default::default()
    }
}

pub fn tracker_mode(current_peak: i64, current_games: i64, previous_peak: i64, previous_games: i64) -> TrackerMode {
    TrackerMode {
        current_peak,
        previous_peak,
        all_time_peak: current_peak.max(previous_peak),
        current_games,
        previous_games,
    }
}

/// Tracker record carrying the same numbers as [`production_fixture`]
pub fn production_tracker(player_id: &str) -> TrackerRecord {
    let mut record = TrackerRecord::new(player_id);
    record.ones = tracker_mode(800, 14, 799, 37);
    record.twos = tracker_mode(1142, 13, 1133, 60);
    record.threes = tracker_mode(1110, 11, 1167, 42);
    record
}

/// A roster mixing tracker-backed, carried-over and brand new players
pub fn mixed_roster(tracker_players: usize) -> Vec<PlayerEntry> {
    let mut roster: Vec<PlayerEntry> = (0..tracker_players)
        .map(|i| {
            let mut record = TrackerRecord::new(format!("tracked_{}", i));
            let peak = 600 + (i as i64 * 37) % 1200;
            record.twos = tracker_mode(peak, 20 + i as i64, peak - 15, 40);
            record.threes = tracker_mode(peak + 10, 15, peak, 25);
            PlayerEntry::from(record).with_name(format!("Tracked {}", i))
        })
        .collect();

    roster.push(PlayerEntry::new("carried").with_existing_rating(
        skillratings::trueskill::TrueSkillRating {
            rating: 1710.0,
            uncertainty: 4.2,
        },
    ));
    roster.push(PlayerEntry::new("fresh").with_name("Fresh Player"));
    roster
}

/// Sink that records every write call for inspection
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    writes: Arc<Mutex<Vec<Vec<StoredRating>>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_calls(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or(0)
    }

    pub fn last_write(&self) -> Vec<StoredRating> {
        self.writes
            .lock()
            .ok()
            .and_then(|w| w.last().cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RatingSink for RecordingSink {
    async fn store_ratings(&self, ratings: Vec<StoredRating>) -> Result<usize> {
        let count = ratings.len();
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(ratings);
        }
        Ok(count)
    }
}
