//! Integration tests for the skill-seed rating pipeline
//!
//! These tests exercise the public API end to end:
//! - Rating engine results for known players
//! - Fallback behavior on invalid input
//! - Tracker records flowing through the batch runner
//! - Configuration loading

mod fixtures;

use skill_seed::batch::{BatchRatingRunner, InMemoryPlayerProvider, InMemoryRatingSink, RatingSource};
use skill_seed::config::{AppConfig, RatingConfig, SkillTransform};
use skill_seed::metrics::MetricsCollector;
use skill_seed::rating::RatingEngine;
use skill_seed::types::{Fallback, Mode, ModeRecord, PlayerSkillInput};
use skill_seed::SeedError;
use std::sync::Arc;

use fixtures::{
    doubles_specialist, low_rank_player, mixed_roster, production_fixture, production_tracker,
    RecordingSink,
};

fn default_engine() -> RatingEngine {
    RatingEngine::new(RatingConfig::default()).unwrap()
}

#[test]
fn test_production_player_regression() {
    let engine = RatingEngine::new(RatingConfig::legacy()).unwrap();
    let rating = engine.compute_rating(&production_fixture()).unwrap();

    assert!((rating.mu - 1805.78).abs() <= 50.0, "mu was {}", rating.mu);
    assert!((rating.mu - 1774.78).abs() < 0.02, "mu was {}", rating.mu);
    assert_eq!(rating.sigma, 7.897);
}

#[test]
fn test_default_curve_ranges() {
    let engine = default_engine();
    for input in [production_fixture(), doubles_specialist(), low_rank_player()] {
        let rating = engine.compute_rating(&input).unwrap();
        assert!((800.0..=2200.0).contains(&rating.mu));
        assert!((2.5..=8.333).contains(&rating.sigma));
        assert!((0.0..=100.0).contains(&rating.skill_result.normalized_skill));
    }
}

#[test]
fn test_doubles_specialist() {
    let rating = default_engine().compute_rating(&doubles_specialist()).unwrap();
    assert_eq!(rating.sigma, 6.778);

    // Threes has only six games and is left out of the aggregate
    let breakdown = &rating.skill_result.breakdown;
    assert_eq!(breakdown[&Mode::Threes].games, 6);
    assert_eq!(breakdown[&Mode::Threes].normalized_skill, None);
    assert!(breakdown[&Mode::Ones].normalized_skill.is_some());
    assert!(breakdown[&Mode::Twos].normalized_skill.is_some());
}

#[test]
fn test_low_rank_player() {
    let rating = default_engine().compute_rating(&low_rank_player()).unwrap();
    assert!((rating.skill_result.normalized_skill - 38.72).abs() < 0.011);
    assert!((rating.mu - 1342.1).abs() < 0.011);
    assert!(rating.mu < 1500.0);
}

#[test]
fn test_single_mode_player() {
    let input = PlayerSkillInput {
        twos: ModeRecord::new(1500, 100, 0, 0),
        ..Default::default()
    };
    let rating = default_engine().compute_rating(&input).unwrap();

    assert_eq!(rating.sigma, 8.263);
    assert!((rating.mu - 2198.96).abs() < 0.011);
    assert_eq!(rating.skill_result.total_games, 100);
    assert!(rating.skill_result.breakdown[&Mode::Ones].normalized_skill.is_none());
}

#[test]
fn test_zero_input_is_median_with_max_uncertainty() {
    let rating = default_engine()
        .compute_rating(&PlayerSkillInput::default())
        .unwrap();
    assert_eq!(rating.skill_result.normalized_skill, 50.0);
    assert_eq!(rating.mu, 1500.0);
    assert_eq!(rating.sigma, 8.333);
    assert!(rating.skill_result.fallback.is_none());
}

#[test]
fn test_negative_input_rejected_then_recovered() {
    let engine = default_engine();
    let input = PlayerSkillInput {
        threes: ModeRecord::new(1000, 10, -5, 10),
        ..Default::default()
    };

    let err = engine.compute_rating(&input).unwrap_err();
    assert_eq!(
        err,
        SeedError::InvalidPlayerData {
            reason: "MMR values cannot be negative".to_string()
        }
    );

    let fallback = engine.compute_rating_or_fallback(&input);
    assert_eq!(fallback.mu, 1000.0);
    assert_eq!(fallback.sigma, 8.333);
    assert_eq!(fallback.skill_result.total_games, 0);
    assert_eq!(fallback.skill_result.fallback, Some(Fallback::DefaultValues));
}

#[test]
fn test_tracker_matches_direct_input() {
    let engine = default_engine();
    let tracker = production_tracker("p1");
    tracker.validate().unwrap();

    let via_tracker = engine.compute_rating(&tracker.to_skill_input()).unwrap();
    let direct = engine.compute_rating(&production_fixture()).unwrap();
    assert!(via_tracker.same_rating(&direct));
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = Arc::new(default_engine());
    let expected = engine.compute_rating(&doubles_specialist()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.compute_rating(&doubles_specialist()).unwrap())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().same_rating(&expected));
    }
}

#[tokio::test]
async fn test_batch_over_mixed_roster() {
    let engine = Arc::new(default_engine());
    let provider = Arc::new(InMemoryPlayerProvider::new(mixed_roster(40)));
    let sink = Arc::new(InMemoryRatingSink::new());
    let metrics = Arc::new(MetricsCollector::new().unwrap());

    let runner = BatchRatingRunner::new(engine, provider, sink.clone())
        .with_chunk_size(7)
        .with_metrics(metrics.clone());
    let report = runner.run().await.unwrap();

    assert_eq!(report.processed, 42);
    assert_eq!(report.tracker_based, 40);
    assert_eq!(report.default_count, 2);
    assert!(report.errors.is_empty());
    assert_eq!(sink.len(), 42);

    assert_eq!(report.ratings[0].player_id, "tracked_0");
    assert_eq!(report.ratings[41].player_id, "fresh");

    let carried = sink.get("carried").unwrap();
    assert_eq!(carried.source, RatingSource::Existing);
    assert_eq!(carried.mu, 1710.0);
    assert_eq!(carried.sigma, 4.2);

    let fresh = sink.get("fresh").unwrap();
    assert_eq!(fresh.source, RatingSource::Default);
    assert_eq!((fresh.mu, fresh.sigma), (1500.0, 8.333));

    let text = metrics.gather_text().unwrap();
    assert!(text.contains("skill_seed_ratings_total{source=\"tracker\"} 40"));
}

#[tokio::test]
async fn test_batch_writes_once() {
    let engine = Arc::new(default_engine());
    let sink = Arc::new(RecordingSink::new());
    let provider = Arc::new(InMemoryPlayerProvider::from_trackers(vec![
        production_tracker("a"),
        production_tracker("b"),
    ]));

    let report = BatchRatingRunner::new(engine, provider, sink.clone())
        .with_chunk_size(1)
        .run()
        .await
        .unwrap();

    assert_eq!(report.stored, 2);
    assert_eq!(sink.write_calls(), 1);
    assert_eq!(sink.last_write().len(), 2);
    assert_eq!(sink.last_write()[0].mu, sink.last_write()[1].mu);
}

#[test]
fn test_config_from_toml() {
    let config = AppConfig::from_toml_str(
        r#"
        [service]
        log_level = "debug"

        [rating]
        mu_min = 0.0
        mu_max = 2000.0
        skill_transform = "piecewise_expansion"
        initial_mu = 1000.0

        [rating.weights]
        ones = 1.0
        twos = 2.0
        threes = 1.0

        [batch]
        chunk_size = 64
        "#,
    )
    .unwrap();

    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.rating.skill_transform, SkillTransform::PiecewiseExpansion);
    assert_eq!(config.rating.weights.twos, 2.0);
    assert_eq!(config.rating.sigma_max, 8.333);
    assert_eq!(config.batch.chunk_size, 64);

    let engine = RatingEngine::new(config.rating).unwrap();
    assert_eq!(engine.default_rating().mu, 1000.0);
}

#[test]
fn test_invalid_config_rejected() {
    let result = AppConfig::from_toml_str(
        r#"
        [rating]
        sigma_min = 9.0
        "#,
    );
    assert!(result.is_err());
}
