//! f1dash - Formula 1 statistics dashboard for the terminal
//!
//! A CLI tool that fetches schedules and race results from the
//! Jolpica/Ergast API and turns them into season statistics: standings,
//! podium and DNF counts, driver comparisons, and CSV exports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, unknown season, etc.)

mod cli;
mod config;
mod dashboard;
mod menu;
mod models;
mod provider;
mod report;
mod season;

use anyhow::{Context, Result};
use cli::{Args, Command};
use config::Config;
use dashboard::Dashboard;
use provider::{Cache, ErgastProvider};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Some(Command::InitConfig)) {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    debug!("f1dash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the requested action
    if let Err(e) = run(args).await {
        error!("Command failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        eprintln!("If this is related to data access, please check your internet connection.");
        std::process::exit(1);
    }
}

/// Handle init-config: generate a default .f1dash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".f1dash.toml");

    if path.exists() {
        anyhow::bail!(".f1dash.toml already exists. Remove it first or edit it manually.");
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .f1dash.toml")?;

    println!("Created .f1dash.toml with default settings.");
    println!("Edit it to customize the API endpoint, cache, and output directory.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: failed to set tracing subscriber");
    }
}

/// Dispatch the parsed command against a freshly built dashboard.
async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let dashboard = build_dashboard(&config)?;

    match args.command {
        None | Some(Command::Menu) => menu::run(&dashboard).await,

        Some(Command::Schedule { year }) => {
            dashboard
                .show_schedule(year.unwrap_or_else(Dashboard::current_year))
                .await
        }

        Some(Command::Results {
            year,
            round,
            chart,
            csv,
        }) => dashboard.show_race_results(year, round, chart, csv).await,

        Some(Command::Fastest { year, round }) => dashboard.show_fastest_lap(year, round).await,

        Some(Command::Summary { year, round }) => dashboard.show_summary(year, round).await,

        Some(Command::Podiums { year, csv }) => dashboard.show_podiums(year, csv).await,

        Some(Command::Dnfs { year, csv }) => dashboard.show_dnfs(year, csv).await,

        Some(Command::Compare {
            driver1,
            driver2,
            start_year,
            end_year,
            csv,
        }) => {
            dashboard
                .compare_drivers(&driver1, &driver2, start_year, end_year, csv)
                .await
        }

        Some(Command::ExportSeason { year }) => dashboard.export_season(year).await,

        Some(Command::ExportHistory {
            start_year,
            end_year,
        }) => dashboard.export_history(start_year, end_year).await,

        Some(Command::InitConfig) => Ok(()), // handled before logging init
    }
}

/// Load configuration from file or use defaults, then apply CLI
/// overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => {
                debug!("Loaded config from .f1dash.toml");
                config
            }
            Ok(None) => {
                debug!("No config file found, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!("Failed to load config: {}", e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    Ok(config)
}

/// Build the dashboard: provider with optional cache, plus output dir.
fn build_dashboard(config: &Config) -> Result<Dashboard> {
    let mut provider = ErgastProvider::with_base_url(config.api.base_url.clone())
        .and_then(|p| p.with_timeout(Duration::from_secs(config.api.timeout_seconds)))
        .context("Failed to initialize the HTTP client")?
        .with_rate_limit(Duration::from_millis(config.api.rate_limit_ms));

    if config.cache.enabled {
        debug!("Response cache enabled at {}", config.cache.dir);
        provider = provider.with_cache(Cache::new(PathBuf::from(&config.cache.dir)));
    }

    Ok(Dashboard::new(
        Box::new(provider),
        PathBuf::from(&config.output.dir),
    ))
}
