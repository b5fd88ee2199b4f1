//! Terminal bar chart for per-race driver points.

use crate::models::RaceResultRow;
use crate::report::table::fmt_points;

/// Maximum bar width in characters.
const MAX_BAR_WIDTH: usize = 40;

/// Render a horizontal bar chart of driver points, highest first.
///
/// Drivers who scored nothing get an empty bar so the field stays
/// visible. Returns an empty string for an empty result set.
pub fn points_chart(rows: &[RaceResultRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<&RaceResultRow> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        b.points
            .partial_cmp(&a.points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let max_points = sorted
        .first()
        .map(|r| r.points)
        .filter(|p| *p > 0.0)
        .unwrap_or(1.0);

    let mut output = String::new();
    for row in sorted {
        let width = ((row.points / max_points) * MAX_BAR_WIDTH as f64).round() as usize;
        output.push_str(&format!(
            "{:>4} | {:<width$} {}\n",
            row.driver,
            "█".repeat(width),
            fmt_points(row.points),
            width = MAX_BAR_WIDTH,
        ));
    }

    output
}
