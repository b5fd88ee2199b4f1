//! Dashboard orchestration.
//!
//! One method per user-facing operation: fetch from the provider, fold
//! through the season aggregator, hand the result to the report layer.
//! Per-round fetch failures are logged and skipped; they never abort a
//! multi-round operation.

use crate::models::{RaceRecord, RaceResult, RoundOutcome, ScheduleEvent};
use crate::provider::RaceDataProvider;
use crate::report::{chart, export, table};
use crate::season;
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};

/// The F1 statistics dashboard.
pub struct Dashboard {
    provider: Box<dyn RaceDataProvider>,
    output_dir: PathBuf,
}

impl Dashboard {
    /// Create a dashboard over a provider, writing exports to
    /// `output_dir`.
    pub fn new(provider: Box<dyn RaceDataProvider>, output_dir: PathBuf) -> Self {
        Self {
            provider,
            output_dir,
        }
    }

    /// The current season year.
    pub fn current_year() -> i32 {
        Utc::now().year()
    }

    /// Display the race calendar for a year, with the next upcoming race
    /// called out when the season is still running.
    pub async fn show_schedule(&self, year: i32) -> Result<()> {
        let schedule = self
            .provider
            .list_rounds(year)
            .await
            .with_context(|| format!("Failed to get race schedule for {}", year))?;

        println!("\n=== F1 {} Race Calendar ===\n", year);
        println!("{}", table::schedule_table(&schedule));

        let now = Utc::now();
        if let Some(upcoming) = schedule.iter().find(|event| event.date > now) {
            println!("\n=== Next Upcoming Race ===\n");
            println!(
                "Round {}: {} — {}, {} on {}",
                upcoming.round,
                upcoming.name,
                upcoming.locality,
                upcoming.country,
                upcoming.date.format("%Y-%m-%d %H:%M UTC"),
            );
        }

        Ok(())
    }

    /// Display one race's results, optionally with a points chart and a
    /// CSV export.
    pub async fn show_race_results(
        &self,
        year: i32,
        round: u32,
        show_chart: bool,
        save_csv: bool,
    ) -> Result<()> {
        let result = self
            .provider
            .fetch_race_result(year, round)
            .await
            .with_context(|| format!("Failed to get race results for {} round {}", year, round))?;

        println!(
            "\n=== Race Results: {} Round {} ({}) ===\n",
            year, round, result.event.name
        );
        println!("{}", table::results_table(&result));

        if show_chart {
            println!("\n=== Driver Points: {} Round {} ===\n", year, round);
            print!("{}", chart::points_chart(&result.rows));
        }

        if save_csv {
            // Same order as the displayed table: classified first.
            let mut rows = result.rows.clone();
            rows.sort_by_key(|r| r.position.unwrap_or(u32::MAX));
            let path = export::write_race_results(&self.output_dir, year, round, &rows)?;
            println!("\nResults saved to {}", path.display());
        }

        Ok(())
    }

    /// Display fastest lap information for a race.
    pub async fn show_fastest_lap(&self, year: i32, round: u32) -> Result<()> {
        let result = self
            .provider
            .fetch_race_result(year, round)
            .await
            .with_context(|| format!("Failed to get race results for {} round {}", year, round))?;

        println!("\n=== Fastest Lap: {} Round {} ===\n", year, round);

        match result.fastest_lap {
            Some(fastest) => {
                println!("Driver: {}", fastest.driver);
                println!("Team: {}", fastest.team);
                println!("Lap Time: {}", fastest.time);
                println!("Lap Number: {}", fastest.lap);
                if let Some(speed) = fastest.average_speed {
                    println!("Average Speed: {} km/h", speed);
                }
            }
            None => println!("No fastest lap data available for this race."),
        }

        Ok(())
    }

    /// Display a grand prix summary: event info, winner, podium, fastest
    /// lap, team points and retirements.
    pub async fn show_summary(&self, year: i32, round: u32) -> Result<()> {
        let result = self
            .provider
            .fetch_race_result(year, round)
            .await
            .with_context(|| format!("Failed to get race results for {} round {}", year, round))?;

        println!("\n=== Grand Prix Summary: {} Round {} ===\n", year, round);
        println!("Event: {}", result.event.name);
        println!(
            "Location: {}, {}",
            result.event.locality, result.event.country
        );
        println!("Date: {}", result.event.date.format("%Y-%m-%d"));
        println!("Circuit: {}", result.event.circuit);

        if let Some(winner) = result
            .rows
            .iter()
            .filter(|r| r.position.is_some())
            .min_by_key(|r| r.position)
        {
            println!(
                "\nWinner: {} ({}) - {}",
                winner.full_name, winner.driver, winner.team
            );
        }

        let podium = season::podium_finishers(&result.rows);
        if !podium.is_empty() {
            println!("\nPodium:");
            for (i, driver) in podium.iter().enumerate() {
                if let Some(row) = result.rows.iter().find(|r| r.driver == *driver) {
                    println!("{}. {} ({}) - {}", i + 1, row.full_name, row.driver, row.team);
                }
            }
        }

        if let Some(fastest) = &result.fastest_lap {
            println!(
                "\nFastest Lap: {} - {} (Lap {})",
                fastest.driver, fastest.time, fastest.lap
            );
        }

        let tally = season::accumulate(vec![RoundOutcome::Loaded {
            round,
            race_name: result.event.name.clone(),
            rows: result.rows.clone(),
        }]);
        println!("\nTeam Points in this Race:\n");
        println!(
            "{}",
            table::points_standings_table("Team", &tally.team_standings())
        );

        let retirements: Vec<_> = result.rows.iter().filter(|r| r.status.is_dnf()).collect();
        if !retirements.is_empty() {
            println!("\nRetirements:");
            for row in retirements {
                println!(
                    "- {} ({}) - {}",
                    row.full_name, row.driver, row.raw_status
                );
            }
        }

        Ok(())
    }

    /// Count and display podiums per driver for a season.
    pub async fn show_podiums(&self, year: i32, save_csv: bool) -> Result<()> {
        println!("\n=== Podium Counts for {} Season ===\n", year);

        let tally = self.season_tally(year).await?;
        println!(
            "{}",
            table::count_standings_table("Driver", "Podiums", &tally.podium_standings())
        );
        print_skipped(&tally);

        if save_csv {
            let path = export::write_podiums(&self.output_dir, year, &tally.podium_standings())?;
            println!("\nSaved to {}", path.display());
        }

        Ok(())
    }

    /// Count and display DNFs per driver for a season.
    pub async fn show_dnfs(&self, year: i32, save_csv: bool) -> Result<()> {
        println!("\n=== DNF Counts for {} Season ===\n", year);

        let tally = self.season_tally(year).await?;
        println!(
            "{}",
            table::count_standings_table("Driver", "DNFs", &tally.dnf_standings())
        );
        print_skipped(&tally);

        if save_csv {
            let path = export::write_dnfs(&self.output_dir, year, &tally.dnf_standings())?;
            println!("\nSaved to {}", path.display());
        }

        Ok(())
    }

    /// Compare two drivers' points and wins across a span of seasons.
    ///
    /// A year whose schedule cannot be enumerated is skipped with a
    /// warning; the comparison continues with the remaining years.
    pub async fn compare_drivers(
        &self,
        first: &str,
        second: &str,
        start_year: i32,
        end_year: i32,
        save_csv: bool,
    ) -> Result<()> {
        let first = first.to_uppercase();
        let second = second.to_uppercase();
        let (start_year, end_year) = normalize_span(start_year, end_year);

        println!("\n=== Driver Comparison: {} vs {} ===\n", first, second);

        let mut records = Vec::new();
        for year in start_year..=end_year {
            let schedule = match self.provider.list_rounds(year).await {
                Ok(schedule) => schedule,
                Err(e) => {
                    warn!("Skipping year {}: {}", year, e);
                    continue;
                }
            };

            let rounds = season::completed_rounds(&schedule, Utc::now());
            let outcomes = self
                .collect_outcomes(year, &rounds, &format!("Year {}", year))
                .await;
            records.push(season::compare_drivers(year, &outcomes, &first, &second));
        }

        println!("{}", table::comparison_table(&records, &first, &second));

        if save_csv {
            let path = export::write_comparison(
                &self.output_dir,
                &first,
                &second,
                start_year,
                end_year,
                &records,
            )?;
            println!("\nSaved to {}", path.display());
        }

        Ok(())
    }

    /// Export full-season details: per-row results with cumulative
    /// points plus driver and team standings, three CSV files.
    pub async fn export_season(&self, year: i32) -> Result<()> {
        println!("\n=== Exporting Full Season Details for {} ===\n", year);

        let outcomes = self.season_outcomes(year).await?;
        let rows = season::season_rows(&outcomes);
        let tally = season::accumulate(outcomes);

        let results_path = export::write_full_season(&self.output_dir, year, &rows)?;
        println!("Full season results saved to {}", results_path.display());

        let drivers_path =
            export::write_driver_standings(&self.output_dir, year, &tally.driver_standings())?;
        println!("Driver standings saved to {}", drivers_path.display());

        let teams_path =
            export::write_team_standings(&self.output_dir, year, &tally.team_standings())?;
        println!("Team standings saved to {}", teams_path.display());

        print_skipped(&tally);
        Ok(())
    }

    /// Export one record per completed race across a span of seasons.
    pub async fn export_history(&self, start_year: i32, end_year: i32) -> Result<()> {
        let (start_year, end_year) = normalize_span(start_year, end_year);

        println!(
            "\n=== Exporting All Race Data from {} to {} ===\n",
            start_year, end_year
        );
        println!("This may take a while depending on the date range...");

        let mut records = Vec::new();
        for year in start_year..=end_year {
            let schedule = match self.provider.list_rounds(year).await {
                Ok(schedule) => schedule,
                Err(e) => {
                    warn!("Skipping year {}: {}", year, e);
                    continue;
                }
            };

            let rounds = season::completed_rounds(&schedule, Utc::now());
            let pb = progress_bar(rounds.len(), &format!("Year {}", year));

            for round in rounds {
                match self.provider.fetch_race_result(year, round).await {
                    Ok(result) => {
                        if let Some(record) = race_record(year, round, &result) {
                            records.push(record);
                        }
                    }
                    Err(e) => warn!("Error processing {} round {}: {}", year, round, e),
                }
                pb.inc(1);
            }
            pb.finish_and_clear();
            info!("Processed year {}", year);
        }

        let path = export::write_race_history(&self.output_dir, start_year, end_year, &records)?;
        println!("\nAll race data saved to {}", path.display());

        Ok(())
    }

    /// Fetch every completed round of a year as outcomes.
    ///
    /// Only schedule enumeration failure is an error; per-round failures
    /// become `RoundOutcome::Failed`.
    async fn season_outcomes(&self, year: i32) -> Result<Vec<RoundOutcome>> {
        let schedule: Vec<ScheduleEvent> = self
            .provider
            .list_rounds(year)
            .await
            .with_context(|| format!("Failed to get race schedule for {}", year))?;

        let rounds = season::completed_rounds(&schedule, Utc::now());
        Ok(self
            .collect_outcomes(year, &rounds, &format!("Season {}", year))
            .await)
    }

    async fn season_tally(&self, year: i32) -> Result<crate::models::SeasonTally> {
        Ok(season::accumulate(self.season_outcomes(year).await?))
    }

    /// Fetch the given rounds sequentially, converting each fetch into a
    /// `RoundOutcome`.
    async fn collect_outcomes(
        &self,
        year: i32,
        rounds: &[u32],
        label: &str,
    ) -> Vec<RoundOutcome> {
        let pb = progress_bar(rounds.len(), label);
        let mut outcomes = Vec::with_capacity(rounds.len());

        for &round in rounds {
            let outcome = match self.provider.fetch_race_result(year, round).await {
                Ok(result) => RoundOutcome::Loaded {
                    round,
                    race_name: result.event.name,
                    rows: result.rows,
                },
                Err(e) => {
                    warn!("Error processing round {}: {}", round, e);
                    RoundOutcome::Failed {
                        round,
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
            pb.inc(1);
        }

        pb.finish_and_clear();
        outcomes
    }
}

/// Swap a back-to-front year span.
fn normalize_span(start_year: i32, end_year: i32) -> (i32, i32) {
    if start_year > end_year {
        (end_year, start_year)
    } else {
        (start_year, end_year)
    }
}

fn progress_bar(len: usize, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len} rounds")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message(label.to_string());
    pb
}

fn print_skipped(tally: &crate::models::SeasonTally) {
    let note = table::skipped_rounds_note(tally);
    if !note.is_empty() {
        println!("\n{}", note);
    }
}

/// Build a history record from one race, `None` when the result has no
/// classified winner.
fn race_record(year: i32, round: u32, result: &RaceResult) -> Option<RaceRecord> {
    let winner = result
        .rows
        .iter()
        .filter(|r| r.position.is_some())
        .min_by_key(|r| r.position)?;

    let (fl_driver, fl_time) = match &result.fastest_lap {
        Some(fl) => (fl.driver.clone(), fl.time.clone()),
        None => ("N/A".to_string(), "N/A".to_string()),
    };

    Some(RaceRecord {
        year,
        round,
        name: result.event.name.clone(),
        date: result.event.date.format("%Y-%m-%d").to_string(),
        circuit: result.event.circuit.clone(),
        country: result.event.country.clone(),
        winner: winner.full_name.clone(),
        winning_team: winner.team.clone(),
        fastest_lap_driver: fl_driver,
        fastest_lap_time: fl_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassifiedStatus, RaceResultRow};
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use chrono::TimeZone;

    /// Provider stub serving two past rounds, the second of which always
    /// fails to fetch.
    struct StubProvider;

    fn stub_event(round: u32) -> ScheduleEvent {
        ScheduleEvent {
            round,
            name: format!("Round {} Grand Prix", round),
            circuit: "Test Circuit".to_string(),
            locality: "Testville".to_string(),
            country: "Testland".to_string(),
            date: Utc.with_ymd_and_hms(2020, 3, round, 14, 0, 0).unwrap(),
        }
    }

    #[async_trait]
    impl crate::provider::RaceDataProvider for StubProvider {
        async fn list_rounds(&self, year: i32) -> Result<Vec<ScheduleEvent>, ProviderError> {
            if year != 2020 {
                return Err(ProviderError::UnknownSeason { year });
            }
            Ok(vec![stub_event(1), stub_event(2)])
        }

        async fn fetch_race_result(
            &self,
            year: i32,
            round: u32,
        ) -> Result<crate::models::RaceResult, ProviderError> {
            if round != 1 {
                return Err(ProviderError::NotFound { year, round });
            }
            Ok(crate::models::RaceResult {
                event: stub_event(round),
                rows: vec![
                    RaceResultRow {
                        driver: "VER".to_string(),
                        full_name: "Max Verstappen".to_string(),
                        team: "Red Bull".to_string(),
                        position: Some(1),
                        status: ClassifiedStatus::Finished,
                        raw_status: "Finished".to_string(),
                        points: 25.0,
                    },
                    RaceResultRow {
                        driver: "HAM".to_string(),
                        full_name: "Lewis Hamilton".to_string(),
                        team: "Mercedes".to_string(),
                        position: None,
                        status: ClassifiedStatus::Retired,
                        raw_status: "Retired".to_string(),
                        points: 0.0,
                    },
                ],
                fastest_lap: None,
            })
        }
    }

    fn stub_dashboard() -> Dashboard {
        Dashboard::new(Box::new(StubProvider), PathBuf::from("."))
    }

    #[tokio::test]
    async fn test_season_tally_skips_failed_rounds() {
        let dashboard = stub_dashboard();
        let tally = dashboard.season_tally(2020).await.unwrap();

        assert_eq!(tally.rounds_processed, 1);
        assert_eq!(tally.rounds_skipped, vec![2]);
        assert_eq!(tally.driver_points.get("VER"), Some(&25.0));
        assert_eq!(tally.dnfs.get("HAM"), Some(&1));
    }

    #[tokio::test]
    async fn test_season_outcomes_unknown_year_is_an_error() {
        let dashboard = stub_dashboard();
        assert!(dashboard.season_outcomes(1949).await.is_err());
    }

    #[test]
    fn test_normalize_span() {
        assert_eq!(normalize_span(2010, 2023), (2010, 2023));
        assert_eq!(normalize_span(2023, 2010), (2010, 2023));
        assert_eq!(normalize_span(2023, 2023), (2023, 2023));
    }

    #[test]
    fn test_race_record_requires_classified_winner() {
        let event = ScheduleEvent {
            round: 1,
            name: "Test Grand Prix".to_string(),
            circuit: "Test Circuit".to_string(),
            locality: "Testville".to_string(),
            country: "Testland".to_string(),
            date: Utc.with_ymd_and_hms(2023, 3, 5, 15, 0, 0).unwrap(),
        };

        let no_winner = RaceResult {
            event: event.clone(),
            rows: vec![RaceResultRow {
                driver: "OCO".to_string(),
                full_name: "Esteban Ocon".to_string(),
                team: "Alpine".to_string(),
                position: None,
                status: ClassifiedStatus::Retired,
                raw_status: "Retired".to_string(),
                points: 0.0,
            }],
            fastest_lap: None,
        };
        assert!(race_record(2023, 1, &no_winner).is_none());

        let with_winner = RaceResult {
            event,
            rows: vec![RaceResultRow {
                driver: "VER".to_string(),
                full_name: "Max Verstappen".to_string(),
                team: "Red Bull".to_string(),
                position: Some(1),
                status: ClassifiedStatus::Finished,
                raw_status: "Finished".to_string(),
                points: 25.0,
            }],
            fastest_lap: None,
        };

        let record = race_record(2023, 1, &with_winner).unwrap();
        assert_eq!(record.winner, "Max Verstappen");
        assert_eq!(record.fastest_lap_driver, "N/A");
        assert_eq!(record.date, "2023-03-05");
    }
}
