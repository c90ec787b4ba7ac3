//! Rank distribution tables
//!
//! Static per-playlist data mapping each rank tier to its MMR range and the
//! share of the ranked population sitting in that tier (Season 14 figures).
//! The percentages are approximate and are not renormalized.

use crate::types::Playlist;
use serde::{Deserialize, Serialize};

/// Rank tiers in canonical order, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RankTier {
    Bronze1,
    Bronze2,
    Bronze3,
    Silver1,
    Silver2,
    Silver3,
    Gold1,
    Gold2,
    Gold3,
    Platinum1,
    Platinum2,
    Platinum3,
    Diamond1,
    Diamond2,
    Diamond3,
    Champion1,
    Champion2,
    Champion3,
    GrandChampion1,
    GrandChampion2,
    GrandChampion3,
    SupersonicLegend,
}

/// Number of rank tiers
pub const TIER_COUNT: usize = 22;

impl RankTier {
    pub const ALL: [RankTier; TIER_COUNT] = [
        RankTier::Bronze1,
        RankTier::Bronze2,
        RankTier::Bronze3,
        RankTier::Silver1,
        RankTier::Silver2,
        RankTier::Silver3,
        RankTier::Gold1,
        RankTier::Gold2,
        RankTier::Gold3,
        RankTier::Platinum1,
        RankTier::Platinum2,
        RankTier::Platinum3,
        RankTier::Diamond1,
        RankTier::Diamond2,
        RankTier::Diamond3,
        RankTier::Champion1,
        RankTier::Champion2,
        RankTier::Champion3,
        RankTier::GrandChampion1,
        RankTier::GrandChampion2,
        RankTier::GrandChampion3,
        RankTier::SupersonicLegend,
    ];

    /// Position in the canonical ordering
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            RankTier::Bronze1 => "Bronze 1",
            RankTier::Bronze2 => "Bronze 2",
            RankTier::Bronze3 => "Bronze 3",
            RankTier::Silver1 => "Silver 1",
            RankTier::Silver2 => "Silver 2",
            RankTier::Silver3 => "Silver 3",
            RankTier::Gold1 => "Gold 1",
            RankTier::Gold2 => "Gold 2",
            RankTier::Gold3 => "Gold 3",
            RankTier::Platinum1 => "Platinum 1",
            RankTier::Platinum2 => "Platinum 2",
            RankTier::Platinum3 => "Platinum 3",
            RankTier::Diamond1 => "Diamond 1",
            RankTier::Diamond2 => "Diamond 2",
            RankTier::Diamond3 => "Diamond 3",
            RankTier::Champion1 => "Champion 1",
            RankTier::Champion2 => "Champion 2",
            RankTier::Champion3 => "Champion 3",
            RankTier::GrandChampion1 => "Grand Champion 1",
            RankTier::GrandChampion2 => "Grand Champion 2",
            RankTier::GrandChampion3 => "Grand Champion 3",
            RankTier::SupersonicLegend => "Supersonic Legend",
        }
    }
}

impl std::fmt::Display for RankTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// MMR bounds of a single tier within a playlist
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankRange {
    pub tier: RankTier,
    pub min_mmr: f64,
    pub max_mmr: f64,
}

/// Raw table for one playlist, indexed by [`RankTier::index`]
#[derive(Debug)]
pub struct RankDistributionTable {
    ranges: [(f64, f64); TIER_COUNT],
    distribution: [f64; TIER_COUNT],
}

impl RankDistributionTable {
    /// Static table for a playlist
    pub fn for_playlist(playlist: Playlist) -> &'static RankDistributionTable {
        match playlist {
            Playlist::SoloDuel => &SOLO_DUEL,
            Playlist::Doubles => &DOUBLES,
            Playlist::Standard => &STANDARD,
        }
    }

    /// MMR range of a tier
    pub fn range(&self, tier: RankTier) -> RankRange {
        let (min_mmr, max_mmr) = self.ranges[tier.index()];
        RankRange {
            tier,
            min_mmr,
            max_mmr,
        }
    }

    /// Population percentage of a tier
    pub fn percentage(&self, tier: RankTier) -> f64 {
        self.distribution[tier.index()]
    }

    /// All ranges in canonical tier order
    pub fn ranges(&self) -> impl Iterator<Item = RankRange> + '_ {
        RankTier::ALL.into_iter().map(move |tier| self.range(tier))
    }
}

/// Outcome of resolving an MMR against a playlist's ranges
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TierLookup {
    Tier(RankRange),
    BelowRange,
    AboveRange,
}

/// Derived lookup index for one playlist: ranges sorted by `min_mmr` and the
/// cumulative population percentage below each tier.
#[derive(Debug, Clone)]
pub struct RankLookup {
    sorted_ranges: Vec<RankRange>,
    cumulative_below: [f64; TIER_COUNT],
    tier_percent: [f64; TIER_COUNT],
}

impl RankLookup {
    /// Build the index from a static table
    pub fn build(table: &RankDistributionTable) -> Self {
        let mut sorted_ranges: Vec<RankRange> = table.ranges().collect();
        sorted_ranges.sort_by(|a, b| a.min_mmr.total_cmp(&b.min_mmr));

        let mut cumulative_below = [0.0; TIER_COUNT];
        let mut tier_percent = [0.0; TIER_COUNT];
        let mut cumulative = 0.0;
        for tier in RankTier::ALL {
            let percent = table.percentage(tier);
            cumulative_below[tier.index()] = cumulative;
            tier_percent[tier.index()] = percent;
            cumulative += percent;
        }

        Self {
            sorted_ranges,
            cumulative_below,
            tier_percent,
        }
    }

    /// Binary search for the tier containing `mmr`.
    ///
    /// Ranges have integer bounds, so a fractional MMR can fall between two
    /// of them; it resolves to the lower tier.
    pub fn find(&self, mmr: f64) -> TierLookup {
        let idx = self.sorted_ranges.partition_point(|r| r.min_mmr <= mmr);
        if idx == 0 {
            return TierLookup::BelowRange;
        }

        let range = self.sorted_ranges[idx - 1];
        if mmr > range.max_mmr && idx == self.sorted_ranges.len() {
            return TierLookup::AboveRange;
        }

        TierLookup::Tier(range)
    }

    /// Population percentage below the start of `tier`
    pub fn cumulative_below(&self, tier: RankTier) -> f64 {
        self.cumulative_below[tier.index()]
    }

    /// Population percentage inside `tier`
    pub fn tier_percent(&self, tier: RankTier) -> f64 {
        self.tier_percent[tier.index()]
    }

    pub fn lowest_mmr(&self) -> f64 {
        self.sorted_ranges.first().map(|r| r.min_mmr).unwrap_or(0.0)
    }

    pub fn highest_mmr(&self) -> f64 {
        self.sorted_ranges.last().map(|r| r.max_mmr).unwrap_or(0.0)
    }
}

static SOLO_DUEL: RankDistributionTable = RankDistributionTable {
    ranges: [
        (0.0, 152.0),
        (153.0, 214.0),
        (215.0, 274.0),
        (275.0, 334.0),
        (335.0, 394.0),
        (395.0, 454.0),
        (455.0, 514.0),
        (515.0, 574.0),
        (575.0, 634.0),
        (635.0, 694.0),
        (695.0, 754.0),
        (755.0, 814.0),
        (815.0, 874.0),
        (875.0, 934.0),
        (935.0, 994.0),
        (995.0, 1054.0),
        (1055.0, 1114.0),
        (1115.0, 1174.0),
        (1175.0, 1234.0),
        (1235.0, 1294.0),
        (1295.0, 1354.0),
        (1355.0, 2000.0),
    ],
    distribution: [
        0.063, 0.296, 0.952, // bronze
        2.248, 4.383, 7.353, // silver
        11.090, 14.354, 16.356, // gold
        16.361, 11.923, 7.116, // platinum
        3.828, 1.864, 0.921, // diamond
        0.473, 0.217, 0.103, // champion
        0.053, 0.024, 0.011, // grand champion
        0.013,
    ],
};

static DOUBLES: RankDistributionTable = RankDistributionTable {
    ranges: [
        (0.0, 152.0),
        (153.0, 214.0),
        (215.0, 274.0),
        (275.0, 334.0),
        (335.0, 394.0),
        (395.0, 454.0),
        (455.0, 514.0),
        (515.0, 574.0),
        (575.0, 634.0),
        (635.0, 694.0),
        (695.0, 754.0),
        (755.0, 814.0),
        (815.0, 874.0),
        (875.0, 934.0),
        (935.0, 994.0),
        (995.0, 1074.0),
        (1075.0, 1174.0),
        (1175.0, 1274.0),
        (1275.0, 1374.0),
        (1375.0, 1474.0),
        (1475.0, 1574.0),
        (1575.0, 2300.0),
    ],
    distribution: [
        0.292, 0.713, 1.485, // bronze
        2.741, 4.411, 6.346, // silver
        8.427, 9.790, 10.237, // gold
        10.422, 9.093, 7.552, // platinum
        8.364, 6.109, 4.451, // diamond
        4.663, 2.397, 1.272, // champion
        0.809, 0.293, 0.087, // grand champion
        0.045,
    ],
};

static STANDARD: RankDistributionTable = RankDistributionTable {
    ranges: [
        (0.0, 152.0),
        (153.0, 214.0),
        (215.0, 274.0),
        (275.0, 334.0),
        (335.0, 394.0),
        (395.0, 454.0),
        (455.0, 514.0),
        (515.0, 574.0),
        (575.0, 634.0),
        (635.0, 694.0),
        (695.0, 754.0),
        (755.0, 834.0),
        (835.0, 914.0),
        (915.0, 994.0),
        (995.0, 1074.0),
        (1075.0, 1174.0),
        (1175.0, 1274.0),
        (1275.0, 1374.0),
        (1375.0, 1474.0),
        (1475.0, 1574.0),
        (1575.0, 1674.0),
        (1675.0, 2300.0),
    ],
    distribution: [
        0.112, 0.347, 0.956, // bronze
        2.316, 4.882, 8.466, // silver
        12.146, 13.673, 12.832, // gold
        11.137, 8.700, 6.701, // platinum
        6.651, 4.291, 2.742, // diamond
        2.339, 0.989, 0.431, // champion
        0.205, 0.064, 0.017, // grand champion
        0.003,
    ],
};
