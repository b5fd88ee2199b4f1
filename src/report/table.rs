//! Plain-text grid tables.
//!
//! A small tabulate-style renderer plus view functions for each of the
//! dashboard's tabular outputs.

use crate::models::{
    ComparisonRecord, RaceResult, RaceResultRow, ScheduleEvent, SeasonTally,
};

/// A renderable text table.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table with the given column headers.
    pub fn new<S: Into<String>>(headers: Vec<S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a data row. Short rows are padded with empty cells.
    pub fn add_row<S: Into<String>>(&mut self, row: Vec<S>) {
        let mut cells: Vec<String> = row.into_iter().map(Into::into).collect();
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    /// Render the table as a grid with `+---+` borders.
    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let separator: String = {
            let mut line = String::from("+");
            for width in &widths {
                line.push_str(&"-".repeat(width + 2));
                line.push('+');
            }
            line
        };

        let render_row = |cells: &[String]| {
            let mut line = String::from("|");
            for (cell, width) in cells.iter().zip(&widths) {
                line.push(' ');
                line.push_str(cell);
                line.push_str(&" ".repeat(width - cell.chars().count() + 1));
                line.push('|');
            }
            line
        };

        let mut output = String::new();
        output.push_str(&separator);
        output.push('\n');
        output.push_str(&render_row(&self.headers));
        output.push('\n');
        output.push_str(&separator);
        output.push('\n');
        for row in &self.rows {
            output.push_str(&render_row(row));
            output.push('\n');
        }
        output.push_str(&separator);
        output
    }
}

/// Format points without a trailing `.0` for whole numbers.
pub fn fmt_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{}", points as i64)
    } else {
        format!("{}", points)
    }
}

/// Format an optional finishing position, `-` when not classified.
pub fn fmt_position(position: Option<u32>) -> String {
    match position {
        Some(p) => p.to_string(),
        None => "-".to_string(),
    }
}

/// Season calendar table.
pub fn schedule_table(schedule: &[ScheduleEvent]) -> String {
    let mut table = Table::new(vec![
        "Round", "Country", "Locality", "Event", "Circuit", "Date (UTC)",
    ]);

    for event in schedule {
        table.add_row(vec![
            event.round.to_string(),
            event.country.clone(),
            event.locality.clone(),
            event.name.clone(),
            event.circuit.clone(),
            event.date.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    table.render()
}

/// Race result table, sorted by classified position with unclassified
/// rows at the bottom in provider order.
pub fn results_table(result: &RaceResult) -> String {
    let mut rows: Vec<&RaceResultRow> = result.rows.iter().collect();
    rows.sort_by_key(|r| r.position.unwrap_or(u32::MAX));

    let mut table = Table::new(vec![
        "Pos", "Driver", "Name", "Team", "Points", "Status",
    ]);

    for row in rows {
        table.add_row(vec![
            fmt_position(row.position),
            row.driver.clone(),
            row.full_name.clone(),
            row.team.clone(),
            fmt_points(row.points),
            row.raw_status.clone(),
        ]);
    }

    table.render()
}

/// Two-column standings table for point totals.
pub fn points_standings_table(label: &str, standings: &[(String, f64)]) -> String {
    let mut table = Table::new(vec![label.to_string(), "Points".to_string()]);
    for (name, points) in standings {
        table.add_row(vec![name.clone(), fmt_points(*points)]);
    }
    table.render()
}

/// Two-column standings table for counters (podiums, DNFs).
pub fn count_standings_table(label: &str, count_label: &str, standings: &[(String, u32)]) -> String {
    let mut table = Table::new(vec![label.to_string(), count_label.to_string()]);
    for (name, count) in standings {
        table.add_row(vec![name.clone(), count.to_string()]);
    }
    table.render()
}

/// Driver comparison table, one row per year.
pub fn comparison_table(records: &[ComparisonRecord], first: &str, second: &str) -> String {
    let mut table = Table::new(vec![
        "Year".to_string(),
        format!("{} Points", first),
        format!("{} Points", second),
        format!("{} Wins", first),
        format!("{} Wins", second),
    ]);

    for record in records {
        table.add_row(vec![
            record.year.to_string(),
            fmt_points(record.first.points),
            fmt_points(record.second.points),
            record.first.wins.to_string(),
            record.second.wins.to_string(),
        ]);
    }

    table.render()
}

/// One-line summary of skipped rounds, empty when nothing was skipped.
pub fn skipped_rounds_note(tally: &SeasonTally) -> String {
    if tally.rounds_skipped.is_empty() {
        String::new()
    } else {
        let rounds: Vec<String> = tally
            .rounds_skipped
            .iter()
            .map(|r| r.to_string())
            .collect();
        format!("Skipped rounds (fetch failed): {}", rounds.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassifiedStatus;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_grid_shape() {
        let mut table = Table::new(vec!["Driver", "Points"]);
        table.add_row(vec!["VER", "25"]);
        table.add_row(vec!["HAM", "18"]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        // border, header, border, two rows, border
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with('+'));
        assert!(lines[1].contains("Driver"));
        assert!(lines[3].contains("VER"));
        // All lines are the same width.
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_fmt_points() {
        assert_eq!(fmt_points(25.0), "25");
        assert_eq!(fmt_points(18.5), "18.5");
        assert_eq!(fmt_points(0.0), "0");
    }

    #[test]
    fn test_fmt_position() {
        assert_eq!(fmt_position(Some(3)), "3");
        assert_eq!(fmt_position(None), "-");
    }

    #[test]
    fn test_results_table_sorts_unclassified_last() {
        let result = RaceResult {
            event: ScheduleEvent {
                round: 1,
                name: "Test Grand Prix".to_string(),
                circuit: "Test Circuit".to_string(),
                locality: "Testville".to_string(),
                country: "Testland".to_string(),
                date: Utc.with_ymd_and_hms(2023, 3, 5, 15, 0, 0).unwrap(),
            },
            rows: vec![
                RaceResultRow {
                    driver: "OCO".to_string(),
                    full_name: "Esteban Ocon".to_string(),
                    team: "Alpine".to_string(),
                    position: None,
                    status: ClassifiedStatus::Retired,
                    raw_status: "Retired".to_string(),
                    points: 0.0,
                },
                RaceResultRow {
                    driver: "VER".to_string(),
                    full_name: "Max Verstappen".to_string(),
                    team: "Red Bull".to_string(),
                    position: Some(1),
                    status: ClassifiedStatus::Finished,
                    raw_status: "Finished".to_string(),
                    points: 25.0,
                },
            ],
            fastest_lap: None,
        };

        let rendered = results_table(&result);
        let ver_line = rendered.lines().position(|l| l.contains("VER")).unwrap();
        let oco_line = rendered.lines().position(|l| l.contains("OCO")).unwrap();
        assert!(ver_line < oco_line);
    }
}
