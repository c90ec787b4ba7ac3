//! Batch rating of a whole player list
//!
//! Players come from a [`PlayerProvider`], ratings go to a [`RatingSink`].
//! Players without tracker data keep their existing rating or receive the
//! configured initial one.

pub mod provider;
pub mod runner;

pub use provider::{
    InMemoryPlayerProvider, InMemoryRatingSink, PlayerEntry, PlayerProvider, RatingSink,
    RatingSource, StoredRating,
};
pub use runner::{BatchError, BatchRatingRunner, BatchReport, DEFAULT_CHUNK_SIZE};
