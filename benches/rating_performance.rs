//! Performance benchmarks for rating calculations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skill_seed::batch::{BatchRatingRunner, InMemoryPlayerProvider, InMemoryRatingSink};
use skill_seed::config::RatingConfig;
use skill_seed::rating::{PercentileConverter, RatingEngine};
use skill_seed::tracker::{TrackerMode, TrackerRecord};
use skill_seed::types::{ModeRecord, Playlist, PlayerSkillInput};
use std::sync::Arc;

fn sample_input() -> PlayerSkillInput {
    PlayerSkillInput::new(
        ModeRecord::new(800, 14, 799, 37),
        ModeRecord::new(1142, 13, 1133, 60),
        ModeRecord::new(1110, 11, 1167, 42),
    )
}

fn sample_trackers(count: usize) -> Vec<TrackerRecord> {
    (0..count)
        .map(|i| {
            let peak = 400 + (i as i64 * 53) % 1600;
            let mut record = TrackerRecord::new(format!("player_{}", i));
            record.twos = TrackerMode {
                current_peak: peak,
                previous_peak: peak - 25,
                all_time_peak: peak,
                current_games: 40 + (i as i64 % 200),
                previous_games: 120,
            };
            record.ones = TrackerMode {
                current_peak: peak - 200,
                current_games: 15,
                ..Default::default()
            };
            record
        })
        .collect()
}

fn bench_percentile_conversion(c: &mut Criterion) {
    let converter = PercentileConverter::new(&RatingConfig::default());
    converter.warm();

    c.bench_function("mmr_to_percentile", |b| {
        b.iter(|| converter.mmr_to_percentile(black_box(1234.5), black_box(Playlist::Doubles)))
    });

    c.bench_function("mmr_to_normalized_skill", |b| {
        b.iter(|| converter.mmr_to_normalized_skill(black_box(987.0), black_box(Playlist::Standard)))
    });
}

fn bench_rating_calculations(c: &mut Criterion) {
    let engine = RatingEngine::new(RatingConfig::default()).unwrap();
    let input = sample_input();

    c.bench_function("compute_rating", |b| {
        b.iter(|| engine.compute_rating(black_box(&input)))
    });

    c.bench_function("estimate_uncertainty", |b| {
        b.iter(|| engine.estimator().estimate(black_box(&input)))
    });
}

fn bench_batch_runs(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let engine = Arc::new(RatingEngine::new(RatingConfig::default()).unwrap());
    let mut group = c.benchmark_group("batch_run");

    for size in [100usize, 1_000, 10_000] {
        let trackers = sample_trackers(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &trackers, |b, trackers| {
            b.iter(|| {
                let runner = BatchRatingRunner::new(
                    engine.clone(),
                    Arc::new(InMemoryPlayerProvider::from_trackers(trackers.clone())),
                    Arc::new(InMemoryRatingSink::new()),
                );
                runtime.block_on(runner.run()).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_percentile_conversion,
    bench_rating_calculations,
    bench_batch_runs
);
criterion_main!(benches);
