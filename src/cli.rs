//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap, including
//! validation and default values. Running without a subcommand starts
//! the interactive menu.

use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// First world championship season.
pub const FIRST_SEASON: i32 = 1950;

/// Maximum plausible round number in a season.
pub const MAX_ROUND: u32 = 30;

/// f1dash - Formula 1 statistics dashboard for the terminal
///
/// Fetches schedules and race results from the Jolpica/Ergast API and
/// turns them into season statistics: standings, podium and DNF counts,
/// driver comparisons, and CSV exports.
///
/// Examples:
///   f1dash schedule 2023
///   f1dash results 2023 5 --chart
///   f1dash podiums 2023 --csv
///   f1dash compare VER HAM 2021 2023
///   f1dash export-season 2023
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Action to run; omit for the interactive menu
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .f1dash.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API base URL
    #[arg(long, global = true, value_name = "URL", env = "F1DASH_API_URL")]
    pub api_url: Option<String>,

    /// Cache directory for API responses
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Disable the on-disk response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Directory for CSV exports
    #[arg(short = 'o', long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Dashboard actions.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Display the race calendar for a season
    Schedule {
        /// Season year (defaults to the current year)
        year: Option<i32>,
    },

    /// Display race results for one round
    Results {
        /// Season year
        year: i32,
        /// Round number
        round: u32,
        /// Also print a points bar chart
        #[arg(long)]
        chart: bool,
        /// Also save the results to CSV
        #[arg(long)]
        csv: bool,
    },

    /// Display fastest lap information for a race
    Fastest {
        /// Season year
        year: i32,
        /// Round number
        round: u32,
    },

    /// Generate a grand prix summary
    Summary {
        /// Season year
        year: i32,
        /// Round number
        round: u32,
    },

    /// Count podiums per driver for a season
    Podiums {
        /// Season year
        year: i32,
        /// Also save the counts to CSV
        #[arg(long)]
        csv: bool,
    },

    /// Count DNFs per driver for a season
    Dnfs {
        /// Season year
        year: i32,
        /// Also save the counts to CSV
        #[arg(long)]
        csv: bool,
    },

    /// Compare two drivers across seasons (e.g. compare VER HAM 2021 2023)
    Compare {
        /// First driver abbreviation
        driver1: String,
        /// Second driver abbreviation
        driver2: String,
        /// Start year
        start_year: i32,
        /// End year
        end_year: i32,
        /// Also save the comparison to CSV
        #[arg(long)]
        csv: bool,
    },

    /// Export full season details to CSV
    ExportSeason {
        /// Season year
        year: i32,
    },

    /// Export race data for a year range to CSV
    ExportHistory {
        /// Start year
        start_year: i32,
        /// End year
        end_year: i32,
    },

    /// Start the interactive menu
    Menu,

    /// Generate a default .f1dash.toml configuration file
    InitConfig,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        match &self.command {
            Some(Command::Schedule { year: Some(year) }) => check_year(*year)?,
            Some(Command::Results { year, round, .. })
            | Some(Command::Fastest { year, round })
            | Some(Command::Summary { year, round }) => {
                check_year(*year)?;
                check_round(*round)?;
            }
            Some(Command::Podiums { year, .. })
            | Some(Command::Dnfs { year, .. })
            | Some(Command::ExportSeason { year }) => check_year(*year)?,
            Some(Command::Compare {
                start_year,
                end_year,
                ..
            })
            | Some(Command::ExportHistory {
                start_year,
                end_year,
            }) => {
                check_year(*start_year)?;
                check_year(*end_year)?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Last acceptable season year: next year's calendar is published early.
pub fn latest_season() -> i32 {
    Utc::now().year() + 1
}

fn check_year(year: i32) -> Result<(), String> {
    let latest = latest_season();
    if !(FIRST_SEASON..=latest).contains(&year) {
        return Err(format!(
            "Year must be between {} and {}",
            FIRST_SEASON, latest
        ));
    }
    Ok(())
}

fn check_round(round: u32) -> Result<(), String> {
    if !(1..=MAX_ROUND).contains(&round) {
        return Err(format!("Round must be between 1 and {}", MAX_ROUND));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Option<Command>) -> Args {
        Args {
            command,
            config: None,
            verbose: false,
            quiet: false,
            api_url: None,
            cache_dir: None,
            no_cache: false,
            output_dir: None,
        }
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(None);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_api_url() {
        let mut args = make_args(None);
        args.api_url = Some("ftp://example.com".to_string());
        assert!(args.validate().is_err());

        args.api_url = Some("https://api.jolpi.ca/ergast/f1".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_year_range() {
        let args = make_args(Some(Command::Podiums {
            year: 1949,
            csv: false,
        }));
        assert!(args.validate().is_err());

        let args = make_args(Some(Command::Podiums {
            year: 2023,
            csv: false,
        }));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_round_range() {
        let args = make_args(Some(Command::Results {
            year: 2023,
            round: 0,
            chart: false,
            csv: false,
        }));
        assert!(args.validate().is_err());

        let args = make_args(Some(Command::Results {
            year: 2023,
            round: 31,
            chart: false,
            csv: false,
        }));
        assert!(args.validate().is_err());

        let args = make_args(Some(Command::Results {
            year: 2023,
            round: 5,
            chart: false,
            csv: false,
        }));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_compare_validates_both_years() {
        let args = make_args(Some(Command::Compare {
            driver1: "VER".to_string(),
            driver2: "HAM".to_string(),
            start_year: 2021,
            end_year: 1900,
            csv: false,
        }));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(None);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
