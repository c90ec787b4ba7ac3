//! Skill Seed - percentile-based TrueSkill seeding
//!
//! This crate turns sparse per-playlist MMR history (peak rating and game count
//! for the current and previous season in 1v1, 2v2 and 3v3) into an initial
//! TrueSkill mu/sigma pair, and rates whole player lists in batch.

pub mod batch;
pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod tracker;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, SeedError, SeedResult};
pub use types::*;

// Re-export key components
pub use batch::{BatchRatingRunner, PlayerProvider, RatingSink};
pub use rating::{PercentileConverter, RatingEngine};
pub use tracker::TrackerRecord;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
