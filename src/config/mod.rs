//! Configuration management for the skill-seed service
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for the seeding pipeline.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, BatchSettings, ServiceSettings};
pub use rating::{ModeWeights, RatingConfig, SkillTransform};
