//! Utility functions for the rating seeder

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique batch run ID
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Round half away from zero to the given number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Clamp a value into `[min, max]`
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
