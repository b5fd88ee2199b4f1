//! The season aggregator: folds ordered per-round outcomes into
//! cumulative tallies.
//!
//! Every function here is a pure fold over already-classified
//! success/failure outcomes. A failed round contributes nothing and never
//! aborts the aggregation; the resulting tallies are exactly what they
//! would have been had the round never existed.

use crate::models::{
    ComparisonRecord, DriverSeasonLine, RaceResultRow, RoundOutcome, ScheduleEvent,
    SeasonResultRow, SeasonTally,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Fold round outcomes into a season tally.
///
/// Rounds are consumed in the order given; callers pass them in ascending
/// round-number (schedule) order. Order only matters for the cumulative
/// column in [`season_rows`], not for the totals produced here.
pub fn accumulate<I>(outcomes: I) -> SeasonTally
where
    I: IntoIterator<Item = RoundOutcome>,
{
    let mut tally = SeasonTally::default();

    for outcome in outcomes {
        match outcome {
            RoundOutcome::Loaded { rows, .. } => {
                fold_round(&mut tally, &rows);
                tally.rounds_processed += 1;
            }
            RoundOutcome::Failed { round, .. } => {
                tally.rounds_skipped.push(round);
            }
        }
    }

    tally
}

/// Fold one successfully fetched round into the tally.
fn fold_round(tally: &mut SeasonTally, rows: &[RaceResultRow]) {
    for row in rows {
        *tally.driver_points.entry(row.driver.clone()).or_default() += row.points;
        *tally.team_points.entry(row.team.clone()).or_default() += row.points;

        if row.status.is_dnf() {
            *tally.dnfs.entry(row.driver.clone()).or_default() += 1;
        }
    }

    for driver in podium_finishers(rows) {
        *tally.podiums.entry(driver.to_string()).or_default() += 1;
    }
}

/// The three drivers with the lowest present finishing positions.
///
/// Ties keep the provider's row order (stable sort, no secondary key);
/// rows without a position are excluded entirely.
pub fn podium_finishers(rows: &[RaceResultRow]) -> Vec<&str> {
    let mut classified: Vec<&RaceResultRow> =
        rows.iter().filter(|r| r.position.is_some()).collect();
    classified.sort_by_key(|r| r.position);

    classified
        .into_iter()
        .take(3)
        .map(|r| r.driver.as_str())
        .collect()
}

/// Build per-row export records with a running cumulative-points column.
///
/// Rows appear in round order, then in the provider's order within each
/// round. The cumulative column is per driver and reflects every loaded
/// round up to and including the row's round.
pub fn season_rows(outcomes: &[RoundOutcome]) -> Vec<SeasonResultRow> {
    let mut running: HashMap<String, f64> = HashMap::new();
    let mut export = Vec::new();

    for outcome in outcomes {
        let (round, race_name, rows) = match outcome {
            RoundOutcome::Loaded {
                round,
                race_name,
                rows,
            } => (*round, race_name, rows),
            RoundOutcome::Failed { .. } => continue,
        };

        for row in rows {
            let total = running.entry(row.driver.clone()).or_default();
            *total += row.points;

            export.push(SeasonResultRow {
                round,
                race: race_name.clone(),
                driver: row.driver.clone(),
                full_name: row.full_name.clone(),
                team: row.team.clone(),
                position: row.position,
                points: row.points,
                status: row.raw_status.clone(),
                cumulative_points: *total,
            });
        }
    }

    export
}

/// Compare two drivers over one year's outcomes.
///
/// Lookup is by exact abbreviation match; a driver absent from a round
/// contributes zero for that round. A win is a finishing position of
/// exactly 1. The record covers this year only.
pub fn compare_drivers(
    year: i32,
    outcomes: &[RoundOutcome],
    first: &str,
    second: &str,
) -> ComparisonRecord {
    ComparisonRecord {
        year,
        first: driver_line(first, outcomes),
        second: driver_line(second, outcomes),
    }
}

fn driver_line(abbreviation: &str, outcomes: &[RoundOutcome]) -> DriverSeasonLine {
    let mut points = 0.0;
    let mut wins = 0;

    for outcome in outcomes {
        let rows = match outcome {
            RoundOutcome::Loaded { rows, .. } => rows,
            RoundOutcome::Failed { .. } => continue,
        };

        if let Some(row) = rows.iter().find(|r| r.driver == abbreviation) {
            points += row.points;
            if row.position == Some(1) {
                wins += 1;
            }
        }
    }

    DriverSeasonLine {
        abbreviation: abbreviation.to_string(),
        points,
        wins,
    }
}

/// Round numbers of events scheduled strictly before `now`.
///
/// Future and rescheduled rounds are silently excluded; the order of the
/// input schedule is preserved.
pub fn completed_rounds(schedule: &[ScheduleEvent], now: DateTime<Utc>) -> Vec<u32> {
    schedule
        .iter()
        .filter(|event| event.date < now)
        .map(|event| event.round)
        .collect()
}
