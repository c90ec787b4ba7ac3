//! Command line entry point for skill-seed
//!
//! Reads a JSON array of tracker records, rates every player through the batch
//! pipeline and prints the batch report as JSON on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use skill_seed::batch::{BatchRatingRunner, InMemoryPlayerProvider, InMemoryRatingSink};
use skill_seed::config::{validate_config, AppConfig, RatingConfig};
use skill_seed::metrics::MetricsCollector;
use skill_seed::rating::RatingEngine;
use skill_seed::tracker::TrackerRecord;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Skill Seed - percentile-based TrueSkill seeding from tracker data
#[derive(Parser)]
#[command(
    name = "skill-seed",
    version,
    about = "Seed TrueSkill ratings from per-playlist MMR and game counts",
    long_about = "Skill Seed converts each player's seasonal peak MMR and game counts in 1v1, 2v2 \
                 and 3v3 into population percentiles, aggregates them into a single mu, and \
                 estimates sigma from activity, diversity, recency and data quality."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Tracker records to rate
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "JSON array of tracker records ('-' or omitted reads stdin)"
    )]
    input: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without rating anyone")]
    dry_run: bool,

    /// Print metrics after the run
    #[arg(long, help = "Print Prometheus metrics to stderr after the run")]
    metrics: bool,

    /// Use the production piecewise curve
    #[arg(
        long,
        help = "Use the piecewise expansion curve with a 0-2000 mu scale"
    )]
    legacy_curve: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if args.legacy_curve {
        let legacy = RatingConfig::legacy();
        config.rating.mu_min = legacy.mu_min;
        config.rating.mu_max = legacy.mu_max;
        config.rating.skill_transform = legacy.skill_transform;
        config.rating.initial_mu = legacy.initial_mu;
    }

    validate_config(&config)?;
    Ok(config)
}

fn read_trackers(input: Option<&PathBuf>) -> Result<Vec<TrackerRecord>> {
    let contents = match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read tracker records from stdin")?;
            buffer
        }
    };

    serde_json::from_str(&contents).context("Input is not a JSON array of tracker records")
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("Skill Seed {}", skill_seed::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Mu scale: {} - {} ({:?})",
        config.rating.mu_min, config.rating.mu_max, config.rating.skill_transform
    );
    info!(
        "   Sigma range: {} - {}",
        config.rating.sigma_min, config.rating.sigma_max
    );
    info!("   Chunk size: {}", config.batch.chunk_size);
}

async fn run(args: &Args, config: AppConfig) -> Result<()> {
    let engine = Arc::new(RatingEngine::new(config.rating.clone())?);

    let trackers = read_trackers(args.input.as_ref())?;
    info!("Loaded {} tracker records", trackers.len());

    let metrics = Arc::new(MetricsCollector::new()?);
    let provider = Arc::new(InMemoryPlayerProvider::from_trackers(trackers));
    let sink = Arc::new(InMemoryRatingSink::new());

    let runner = BatchRatingRunner::new(engine, provider, sink)
        .with_chunk_size(config.batch.chunk_size)
        .with_metrics(metrics.clone());

    let report = runner.run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if args.metrics {
        eprintln!("{}", metrics.gather_text()?);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting without rating players");
        return Ok(());
    }

    if let Err(e) = run(&args, config).await {
        error!("Rating run failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
