//! Data models for the F1 statistics dashboard.
//!
//! This module contains the core data structures used throughout the
//! application for representing schedules, race results, and season
//! tallies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Finishing classification of a driver in a race.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassifiedStatus {
    /// Crossed the line under full race distance.
    Finished,
    /// Retired during the race (mechanical failure, accident, etc.).
    Retired,
    /// Disqualified from the results.
    Disqualified,
    /// Running at the end but not classified (insufficient distance).
    NotClassified,
    /// Any other status label reported by the provider (e.g. "+1 Lap").
    Other(String),
}

impl ClassifiedStatus {
    /// Whether this status counts as a DNF.
    ///
    /// Policy: every status other than `Finished` counts, including
    /// disqualifications and lapped finishers. This mirrors the upstream
    /// data's `Status != "Finished"` filter.
    pub fn is_dnf(&self) -> bool {
        !matches!(self, ClassifiedStatus::Finished)
    }
}

impl fmt::Display for ClassifiedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifiedStatus::Finished => write!(f, "Finished"),
            ClassifiedStatus::Retired => write!(f, "Retired"),
            ClassifiedStatus::Disqualified => write!(f, "Disqualified"),
            ClassifiedStatus::NotClassified => write!(f, "Not Classified"),
            ClassifiedStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ClassifiedStatus {
    fn from(s: &str) -> Self {
        match s {
            "Finished" => ClassifiedStatus::Finished,
            "Retired" => ClassifiedStatus::Retired,
            "Disqualified" => ClassifiedStatus::Disqualified,
            "Not classified" | "Not Classified" => ClassifiedStatus::NotClassified,
            other => ClassifiedStatus::Other(other.to_string()),
        }
    }
}

/// One driver's row in a race result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResultRow {
    /// Driver abbreviation (e.g. "VER"), unique within a season.
    pub driver: String,
    /// Driver's full name.
    pub full_name: String,
    /// Constructor/team name.
    pub team: String,
    /// Finishing position (1-based), `None` when not classified.
    pub position: Option<u32>,
    /// Classification of the finish.
    pub status: ClassifiedStatus,
    /// Raw status label as reported by the provider.
    pub raw_status: String,
    /// Championship points awarded for this race.
    pub points: f64,
}

/// One scheduled race event in a season calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEvent {
    /// Round number within the season (1-based).
    pub round: u32,
    /// Official event name (e.g. "Monaco Grand Prix").
    pub name: String,
    /// Circuit name.
    pub circuit: String,
    /// Locality of the circuit.
    pub locality: String,
    /// Country of the event.
    pub country: String,
    /// Scheduled race start, UTC.
    pub date: DateTime<Utc>,
}

/// A fully loaded race result: event metadata plus the finishing rows.
#[derive(Debug, Clone)]
pub struct RaceResult {
    /// The event this result belongs to.
    pub event: ScheduleEvent,
    /// Finishing rows in the provider's order.
    pub rows: Vec<RaceResultRow>,
    /// Fastest lap of the race, when the provider reports one.
    pub fastest_lap: Option<FastestLap>,
}

/// Fastest lap information for a race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastestLap {
    /// Driver abbreviation.
    pub driver: String,
    /// Team name.
    pub team: String,
    /// Lap number on which the fastest lap was set.
    pub lap: u32,
    /// Lap time as reported (e.g. "1:13.078").
    pub time: String,
    /// Average speed in km/h, when available.
    pub average_speed: Option<f64>,
}

/// Outcome of fetching one round: either a loaded result set or a
/// recorded failure. Failed rounds contribute nothing to any tally.
#[derive(Debug, Clone)]
pub enum RoundOutcome {
    /// The round was fetched successfully.
    Loaded {
        /// Round number.
        round: u32,
        /// Event name, carried through to export rows.
        race_name: String,
        /// Finishing rows in the provider's order.
        rows: Vec<RaceResultRow>,
    },
    /// The round could not be fetched.
    Failed {
        /// Round number.
        round: u32,
        /// Human-readable failure reason.
        reason: String,
    },
}

impl RoundOutcome {
    /// Round number regardless of outcome.
    pub fn round(&self) -> u32 {
        match self {
            RoundOutcome::Loaded { round, .. } => *round,
            RoundOutcome::Failed { round, .. } => *round,
        }
    }
}

/// Cumulative season tallies built by the aggregator.
///
/// All maps are locally owned and returned by value; nothing is shared
/// across invocations.
#[derive(Debug, Clone, Default)]
pub struct SeasonTally {
    /// Accumulated points per driver abbreviation.
    pub driver_points: HashMap<String, f64>,
    /// Accumulated points per team name.
    pub team_points: HashMap<String, f64>,
    /// Podium (top-3) count per driver abbreviation.
    pub podiums: HashMap<String, u32>,
    /// DNF count per driver abbreviation.
    pub dnfs: HashMap<String, u32>,
    /// Number of rounds that were fetched and folded.
    pub rounds_processed: u32,
    /// Round numbers that failed to fetch and were skipped.
    pub rounds_skipped: Vec<u32>,
}

impl SeasonTally {
    /// Driver standings sorted by points, descending.
    pub fn driver_standings(&self) -> Vec<(String, f64)> {
        sorted_by_value_f64(&self.driver_points)
    }

    /// Team standings sorted by points, descending.
    pub fn team_standings(&self) -> Vec<(String, f64)> {
        sorted_by_value_f64(&self.team_points)
    }

    /// Podium counts sorted descending.
    pub fn podium_standings(&self) -> Vec<(String, u32)> {
        sorted_by_value_u32(&self.podiums)
    }

    /// DNF counts sorted descending.
    pub fn dnf_standings(&self) -> Vec<(String, u32)> {
        sorted_by_value_u32(&self.dnfs)
    }
}

fn sorted_by_value_f64(map: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries
}

fn sorted_by_value_u32(map: &HashMap<String, u32>) -> Vec<(String, u32)> {
    let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    entries
}

/// One driver's points and wins for a single season.
#[derive(Debug, Clone, Serialize)]
pub struct DriverSeasonLine {
    /// Driver abbreviation.
    pub abbreviation: String,
    /// Points accumulated over the season's completed rounds.
    pub points: f64,
    /// Race wins in that season.
    pub wins: u32,
}

/// Head-to-head comparison of two drivers for one year.
///
/// Figures are per-year only; the caller iterates years and collects one
/// record each.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRecord {
    /// Season year.
    pub year: i32,
    /// First driver's line.
    pub first: DriverSeasonLine,
    /// Second driver's line.
    pub second: DriverSeasonLine,
}

/// One row of the full-season export, carrying the driver's running
/// points total as of that round.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonResultRow {
    /// Round number.
    pub round: u32,
    /// Event name.
    pub race: String,
    /// Driver abbreviation.
    pub driver: String,
    /// Driver's full name.
    pub full_name: String,
    /// Team name.
    pub team: String,
    /// Finishing position, if classified.
    pub position: Option<u32>,
    /// Points awarded in this race.
    pub points: f64,
    /// Raw status label.
    pub status: String,
    /// Driver's cumulative points after this round.
    pub cumulative_points: f64,
}

/// One race's record in the all-time history export.
#[derive(Debug, Clone, Serialize)]
pub struct RaceRecord {
    /// Season year.
    pub year: i32,
    /// Round number.
    pub round: u32,
    /// Event name.
    pub name: String,
    /// Race date (YYYY-MM-DD).
    pub date: String,
    /// Circuit name.
    pub circuit: String,
    /// Country.
    pub country: String,
    /// Winner's full name.
    pub winner: String,
    /// Winning team.
    pub winning_team: String,
    /// Fastest-lap driver, "N/A" when unavailable.
    pub fastest_lap_driver: String,
    /// Fastest-lap time, "N/A" when unavailable.
    pub fastest_lap_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            ClassifiedStatus::from("Finished"),
            ClassifiedStatus::Finished
        );
        assert_eq!(
            ClassifiedStatus::from("Disqualified"),
            ClassifiedStatus::Disqualified
        );
        assert_eq!(
            ClassifiedStatus::from("Not classified"),
            ClassifiedStatus::NotClassified
        );
        assert_eq!(
            ClassifiedStatus::from("+1 Lap"),
            ClassifiedStatus::Other("+1 Lap".to_string())
        );
    }

    #[test]
    fn test_dnf_policy() {
        // Everything other than Finished counts, DSQ and lapped included.
        assert!(!ClassifiedStatus::Finished.is_dnf());
        assert!(ClassifiedStatus::Retired.is_dnf());
        assert!(ClassifiedStatus::Disqualified.is_dnf());
        assert!(ClassifiedStatus::NotClassified.is_dnf());
        assert!(ClassifiedStatus::Other("+2 Laps".to_string()).is_dnf());
    }

    #[test]
    fn test_tally_sorted_views() {
        let mut tally = SeasonTally::default();
        tally.driver_points.insert("HAM".to_string(), 180.0);
        tally.driver_points.insert("VER".to_string(), 220.5);
        tally.dnfs.insert("PER".to_string(), 3);
        tally.dnfs.insert("HAM".to_string(), 1);

        let standings = tally.driver_standings();
        assert_eq!(standings[0].0, "VER");
        assert_eq!(standings[1].0, "HAM");

        let dnfs = tally.dnf_standings();
        assert_eq!(dnfs[0], ("PER".to_string(), 3));
    }

    #[test]
    fn test_round_outcome_round() {
        let loaded = RoundOutcome::Loaded {
            round: 5,
            race_name: "Monaco Grand Prix".to_string(),
            rows: Vec::new(),
        };
        let failed = RoundOutcome::Failed {
            round: 6,
            reason: "unreachable".to_string(),
        };
        assert_eq!(loaded.round(), 5);
        assert_eq!(failed.round(), 6);
    }
}
