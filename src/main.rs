//! Command line entry point for the leaderboard engine
//!
//! Validates configuration, or replays a file of recorded contests through
//! the engine and prints the resulting rankings as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use leaderboard_engine::config::AppConfig;
use leaderboard_engine::service::{AppState, ReplayFile};
use std::path::PathBuf;
use tracing::{error, info};

/// Leaderboard Engine - Weng-Lin ratings and rankings for multi-party contests
#[derive(Parser)]
#[command(
    name = "leaderboard-engine",
    version,
    about = "Rating and ranking engine for multi-party contest leaderboards"
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

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Minimum games override
    #[arg(long, value_name = "GAMES", help = "Override games needed to leave placement")]
    min_games: Option<u32>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate configuration and exit
    Check,

    /// Replay a JSON file of contests and print the final rankings
    Replay {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Also print Prometheus metrics gathered during the replay
        #[arg(long)]
        metrics: bool,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with engine settings
fn display_startup_banner(config: &AppConfig) {
    info!("Leaderboard Engine {}", leaderboard_engine::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Initial belief: mu={} sigma={}",
        config.rating.initial_mu, config.rating.initial_sigma
    );
    info!(
        "   Display score: mu - {} * sigma",
        config.rating.display_sigma_multiplier
    );
    info!(
        "   Games for ranking: {}",
        config.ledger.min_games_for_ranking
    );
    info!("   Lock timeout: {}ms", config.ledger.lock_timeout_ms);
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(min_games) = args.min_games {
        config.ledger.min_games_for_ranking = min_games;
    }

    leaderboard_engine::config::validate_config(&config)?;
    Ok(config)
}

async fn run_replay(config: AppConfig, file: PathBuf, print_metrics: bool) -> Result<()> {
    let replay = ReplayFile::from_file(&file)?;
    info!(
        "Replaying {} contests from {}",
        replay.contests.len(),
        file.display()
    );

    let app_state = AppState::new(config)?;
    let summary = app_state.replay(&replay).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    if print_metrics {
        println!("{}", app_state.metrics().render()?);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    match args.command {
        Command::Check => {
            info!("Configuration validation successful");
            Ok(())
        }
        Command::Replay { file, metrics } => {
            if let Err(e) = run_replay(config, file, metrics).await {
                error!("Replay failed: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
