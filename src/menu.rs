//! Interactive menu mode.
//!
//! A numbered stdin-driven menu over the dashboard operations. Input is
//! validated and re-prompted in a loop; a failed operation prints its
//! error and returns to the menu instead of exiting.

use crate::cli::{latest_season, FIRST_SEASON, MAX_ROUND};
use crate::dashboard::Dashboard;
use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};

/// Run the interactive menu until the user exits.
pub async fn run(dashboard: &Dashboard) -> Result<()> {
    print_intro();

    loop {
        print_main_menu();
        let choice = prompt_number("Enter your choice (0-6): ", 0, 6)?;

        let outcome = match choice {
            0 => {
                println!("\nThank you for using f1dash. Goodbye!");
                return Ok(());
            }
            1 => schedule_menu(dashboard).await,
            2 => race_menu(dashboard).await,
            3 => driver_menu(dashboard).await,
            4 => season_menu(dashboard).await,
            5 => history_menu(dashboard).await,
            6 => export_menu(dashboard).await,
            _ => Ok(()),
        };

        if let Err(e) = outcome {
            eprintln!("\nError: {:#}", e);
        }

        prompt("\nPress Enter to continue...")?;
    }
}

fn print_intro() {
    println!("\n{}", "=".repeat(72));
    println!("{:^72}", "F1 STATISTICS DASHBOARD");
    println!("{}", "=".repeat(72));
    println!("\nSeason statistics, driver comparisons, and CSV exports");
    println!("powered by the Jolpica/Ergast API.");
}

fn print_main_menu() {
    println!("\nMAIN MENU");
    println!("{}", "-".repeat(50));
    println!("1. View Race Schedule");
    println!("2. Race Results & Analysis");
    println!("3. Driver Statistics");
    println!("4. Season Analysis");
    println!("5. Historical Data");
    println!("6. Export Options");
    println!("0. Exit");
    println!("{}", "-".repeat(50));
}

async fn schedule_menu(dashboard: &Dashboard) -> Result<()> {
    println!("\nVIEW RACE SCHEDULE");
    println!("{}", "-".repeat(50));
    println!("1. Current Season Schedule");
    println!("2. Specific Year Schedule");
    println!("3. Return to Main Menu");

    match prompt_number("Enter your choice (1-3): ", 1, 3)? {
        1 => dashboard.show_schedule(Dashboard::current_year()).await,
        2 => dashboard.show_schedule(prompt_year()?).await,
        _ => Ok(()),
    }
}

async fn race_menu(dashboard: &Dashboard) -> Result<()> {
    println!("\nRACE RESULTS & ANALYSIS");
    println!("{}", "-".repeat(50));
    println!("1. Race Results");
    println!("2. Fastest Lap Information");
    println!("3. Grand Prix Summary");
    println!("4. Return to Main Menu");

    let choice = prompt_number("Enter your choice (1-4): ", 1, 4)?;
    if choice == 4 {
        return Ok(());
    }

    let year = prompt_year()?;
    let round = prompt_round()?;

    match choice {
        1 => {
            let chart = prompt_yes("Print points chart? (y/n): ")?;
            let csv = prompt_yes("Save to CSV? (y/n): ")?;
            dashboard.show_race_results(year, round, chart, csv).await
        }
        2 => dashboard.show_fastest_lap(year, round).await,
        3 => dashboard.show_summary(year, round).await,
        _ => Ok(()),
    }
}

async fn driver_menu(dashboard: &Dashboard) -> Result<()> {
    println!("\nDRIVER STATISTICS");
    println!("{}", "-".repeat(50));
    println!("1. Count Podiums for Season");
    println!("2. Count DNFs for Season");
    println!("3. Compare Two Drivers");
    println!("4. Return to Main Menu");

    match prompt_number("Enter your choice (1-4): ", 1, 4)? {
        1 => {
            let year = prompt_year()?;
            let csv = prompt_yes("Save to CSV? (y/n): ")?;
            dashboard.show_podiums(year, csv).await
        }
        2 => {
            let year = prompt_year()?;
            let csv = prompt_yes("Save to CSV? (y/n): ")?;
            dashboard.show_dnfs(year, csv).await
        }
        3 => {
            let driver1 = prompt("Enter first driver abbreviation (e.g. HAM): ")?;
            let driver2 = prompt("Enter second driver abbreviation (e.g. VER): ")?;
            let start = prompt_year()?;
            let end = prompt_year()?;
            let csv = prompt_yes("Save to CSV? (y/n): ")?;
            dashboard
                .compare_drivers(&driver1, &driver2, start, end, csv)
                .await
        }
        _ => Ok(()),
    }
}

async fn season_menu(dashboard: &Dashboard) -> Result<()> {
    println!("\nSEASON ANALYSIS");
    println!("{}", "-".repeat(50));
    println!("1. Full Season Details");
    println!("2. Return to Main Menu");

    match prompt_number("Enter your choice (1-2): ", 1, 2)? {
        1 => dashboard.export_season(prompt_year()?).await,
        _ => Ok(()),
    }
}

async fn history_menu(dashboard: &Dashboard) -> Result<()> {
    println!("\nHISTORICAL DATA");
    println!("{}", "-".repeat(50));
    println!("1. Export All Race Data for Date Range");
    println!("2. Return to Main Menu");

    match prompt_number("Enter your choice (1-2): ", 1, 2)? {
        1 => {
            let start = prompt_year()?;
            let end = prompt_year()?;
            dashboard.export_history(start, end).await
        }
        _ => Ok(()),
    }
}

async fn export_menu(dashboard: &Dashboard) -> Result<()> {
    println!("\nEXPORT OPTIONS");
    println!("{}", "-".repeat(50));
    println!("1. Export Full Season Details");
    println!("2. Export All-Time Race Data");
    println!("3. Return to Main Menu");

    match prompt_number("Enter your choice (1-3): ", 1, 3)? {
        1 => dashboard.export_season(prompt_year()?).await,
        2 => {
            let start = prompt_year()?;
            let end = prompt_year()?;
            dashboard.export_history(start, end).await
        }
        _ => Ok(()),
    }
}

/// Print a prompt and read one trimmed line from stdin.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    read_trimmed_line(&mut std::io::stdin().lock())
}

/// Read one trimmed line from `input`.
///
/// A zero-byte read means the stream is closed; treating it as an error
/// lets the re-prompting loops exit instead of spinning on empty input.
fn read_trimmed_line(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    if bytes == 0 {
        bail!("stdin closed");
    }

    Ok(line.trim().to_string())
}

/// Prompt until the user enters an integer within `min..=max`.
fn prompt_number(message: &str, min: i64, max: i64) -> Result<i64> {
    loop {
        match prompt(message)?.parse::<i64>() {
            Ok(value) if (min..=max).contains(&value) => return Ok(value),
            Ok(_) => println!("Please enter a number between {} and {}", min, max),
            Err(_) => println!("Please enter a valid number"),
        }
    }
}

fn prompt_year() -> Result<i32> {
    let latest = latest_season();
    let year = prompt_number(
        &format!("Enter year ({}-{}): ", FIRST_SEASON, latest),
        i64::from(FIRST_SEASON),
        i64::from(latest),
    )?;
    Ok(year as i32)
}

fn prompt_round() -> Result<u32> {
    let round = prompt_number(
        &format!("Enter race round number (1-{}): ", MAX_ROUND),
        1,
        i64::from(MAX_ROUND),
    )?;
    Ok(round as u32)
}

fn prompt_yes(message: &str) -> Result<bool> {
    Ok(prompt(message)?.eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_trimmed_line_strips_whitespace() {
        let mut input = "  3  \n".as_bytes();
        assert_eq!(read_trimmed_line(&mut input).unwrap(), "3");
    }

    #[test]
    fn test_read_trimmed_line_errors_on_closed_stream() {
        let mut input = "".as_bytes();
        let err = read_trimmed_line(&mut input).unwrap_err();
        assert!(err.to_string().contains("stdin closed"));
    }
}
