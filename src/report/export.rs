//! CSV export.
//!
//! Each writer builds its file name from the request (year, drivers, year
//! span) and returns the path it wrote, so callers can report it.

use crate::models::{ComparisonRecord, RaceRecord, RaceResultRow, SeasonResultRow};
use crate::report::table::{fmt_points, fmt_position};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }
    }
    csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))
}

/// Write one race's result rows to `race{round}_results_{year}.csv`.
pub fn write_race_results(
    dir: &Path,
    year: i32,
    round: u32,
    rows: &[RaceResultRow],
) -> Result<PathBuf> {
    let path = dir.join(format!("race{}_results_{}.csv", round, year));
    let mut wtr = writer(&path)?;

    wtr.write_record(["Position", "Driver", "FullName", "Team", "Points", "Status"])?;
    for row in rows {
        wtr.write_record([
            fmt_position(row.position),
            row.driver.clone(),
            row.full_name.clone(),
            row.team.clone(),
            fmt_points(row.points),
            row.raw_status.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Write the full-season row export to `full_season_{year}_results.csv`.
pub fn write_full_season(dir: &Path, year: i32, rows: &[SeasonResultRow]) -> Result<PathBuf> {
    let path = dir.join(format!("full_season_{}_results.csv", year));
    let mut wtr = writer(&path)?;

    wtr.write_record([
        "Round",
        "Race",
        "Driver",
        "FullName",
        "Team",
        "Position",
        "Points",
        "Status",
        "CumulativePoints",
    ])?;
    for row in rows {
        wtr.write_record([
            row.round.to_string(),
            row.race.clone(),
            row.driver.clone(),
            row.full_name.clone(),
            row.team.clone(),
            fmt_position(row.position),
            fmt_points(row.points),
            row.status.clone(),
            fmt_points(row.cumulative_points),
        ])?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Write driver standings to `driver_standings_{year}.csv`.
pub fn write_driver_standings(
    dir: &Path,
    year: i32,
    standings: &[(String, f64)],
) -> Result<PathBuf> {
    write_points_file(
        dir.join(format!("driver_standings_{}.csv", year)),
        "Driver",
        standings,
    )
}

/// Write team standings to `team_standings_{year}.csv`.
pub fn write_team_standings(dir: &Path, year: i32, standings: &[(String, f64)]) -> Result<PathBuf> {
    write_points_file(
        dir.join(format!("team_standings_{}.csv", year)),
        "Team",
        standings,
    )
}

fn write_points_file(
    path: PathBuf,
    label: &str,
    standings: &[(String, f64)],
) -> Result<PathBuf> {
    let mut wtr = writer(&path)?;

    wtr.write_record([label, "Points"])?;
    for (name, points) in standings {
        wtr.write_record([name.clone(), fmt_points(*points)])?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Write podium counts to `podiums_{year}.csv`.
pub fn write_podiums(dir: &Path, year: i32, standings: &[(String, u32)]) -> Result<PathBuf> {
    write_count_file(
        dir.join(format!("podiums_{}.csv", year)),
        "Podiums",
        standings,
    )
}

/// Write DNF counts to `dnfs_{year}.csv`.
pub fn write_dnfs(dir: &Path, year: i32, standings: &[(String, u32)]) -> Result<PathBuf> {
    write_count_file(dir.join(format!("dnfs_{}.csv", year)), "DNFs", standings)
}

fn write_count_file(
    path: PathBuf,
    count_label: &str,
    standings: &[(String, u32)],
) -> Result<PathBuf> {
    let mut wtr = writer(&path)?;

    wtr.write_record(["Driver", count_label])?;
    for (name, count) in standings {
        wtr.write_record([name.clone(), count.to_string()])?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Write a driver comparison to
/// `comparison_{d1}_{d2}_{start}_{end}.csv`.
pub fn write_comparison(
    dir: &Path,
    first: &str,
    second: &str,
    start_year: i32,
    end_year: i32,
    records: &[ComparisonRecord],
) -> Result<PathBuf> {
    let path = dir.join(format!(
        "comparison_{}_{}_{}_{}.csv",
        first, second, start_year, end_year
    ));
    let mut wtr = writer(&path)?;

    wtr.write_record([
        "Year".to_string(),
        format!("{} Points", first),
        format!("{} Points", second),
        format!("{} Wins", first),
        format!("{} Wins", second),
    ])?;
    for record in records {
        wtr.write_record([
            record.year.to_string(),
            fmt_points(record.first.points),
            fmt_points(record.second.points),
            record.first.wins.to_string(),
            record.second.wins.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Write race history records to `all_f1_races_{start}_to_{end}.csv`.
pub fn write_race_history(
    dir: &Path,
    start_year: i32,
    end_year: i32,
    records: &[RaceRecord],
) -> Result<PathBuf> {
    let path = dir.join(format!("all_f1_races_{}_to_{}.csv", start_year, end_year));
    let mut wtr = writer(&path)?;

    wtr.write_record([
        "Year",
        "Round",
        "Name",
        "Date",
        "Circuit",
        "Country",
        "Winner",
        "WinningTeam",
        "FastestLapDriver",
        "FastestLapTime",
    ])?;
    for record in records {
        wtr.write_record([
            record.year.to_string(),
            record.round.to_string(),
            record.name.clone(),
            record.date.clone(),
            record.circuit.clone(),
            record.country.clone(),
            record.winner.clone(),
            record.winning_team.clone(),
            record.fastest_lap_driver.clone(),
            record.fastest_lap_time.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(path)
}
