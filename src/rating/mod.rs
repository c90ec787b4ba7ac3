//! Percentile-based rating seeding
//!
//! This module converts per-mode MMR history into TrueSkill mu/sigma pairs:
//! rank distribution tables, percentile conversion, the MMR calculator,
//! uncertainty estimation and the engine that ties them together.

pub mod distribution;
pub mod engine;
pub mod mmr;
pub mod percentile;
pub mod uncertainty;

// Re-export commonly used types
pub use distribution::{RankDistributionTable, RankLookup, RankRange, RankTier, TierLookup};
pub use engine::RatingEngine;
pub use mmr::MmrCalculator;
pub use percentile::PercentileConverter;
pub use uncertainty::{UncertaintyBreakdown, UncertaintyEstimator};
