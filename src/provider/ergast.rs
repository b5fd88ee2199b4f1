//! Jolpica/Ergast API provider.
//!
//! Implements [`RaceDataProvider`] against the Ergast-compatible JSON API
//! (`/ergast/f1/{year}.json`, `/ergast/f1/{year}/{round}/results.json`).
//! The API serves numbers as strings; wire types here keep that shape and
//! the mapping layer parses them into domain types.
//!
//! Requests are spaced out because the public API is rate limited, and
//! raw responses are cached on disk when a [`Cache`] is configured.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{Cache, CacheCategory, ProviderError, RaceDataProvider};
use crate::models::{
    ClassifiedStatus, FastestLap, RaceResult, RaceResultRow, ScheduleEvent,
};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.jolpi.ca/ergast/f1";

/// Default spacing between requests in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 500;

/// User agent for HTTP requests.
const USER_AGENT: &str = concat!("f1dash/", env!("CARGO_PKG_VERSION"));

/// Ergast-compatible race data provider.
#[derive(Debug)]
pub struct ErgastProvider {
    client: reqwest::Client,
    base_url: String,
    cache: Option<Cache>,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl ErgastProvider {
    /// Create a provider against a custom base URL (no trailing slash).
    pub fn with_base_url(base_url: String) -> Result<Self, ProviderError> {
        Self::build(base_url, Duration::from_secs(30))
    }

    /// Attach an on-disk response cache.
    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, ProviderError> {
        let mut provider = Self::build(self.base_url, timeout)?;
        provider.cache = self.cache;
        provider.rate_limit_ms = self.rate_limit_ms;
        Ok(provider)
    }

    fn build(base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            cache: None,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        })
    }

    /// Override the spacing between requests.
    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit_ms = rate_limit.as_millis() as u64;
        self
    }

    /// Wait out the remainder of the request spacing window.
    async fn apply_rate_limit(&self) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            Ordering::Relaxed,
        );
    }

    /// Fetch a JSON document, consulting the cache first.
    async fn get_json(
        &self,
        url: &str,
        category: CacheCategory,
        key: &str,
    ) -> Result<serde_json::Value, ProviderError> {
        if let Some(ref cache) = self.cache {
            if let Some(value) = cache.get::<serde_json::Value>(category, key) {
                return Ok(value);
            }
        }

        self.apply_rate_limit().await;

        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                code: response.status().as_u16(),
            });
        }

        let value: serde_json::Value = response.json().await?;

        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.put(category, key, &value) {
                warn!("Failed to cache response for {}: {}", key, e);
            }
        }

        Ok(value)
    }
}

#[async_trait]
impl RaceDataProvider for ErgastProvider {
    async fn list_rounds(&self, year: i32) -> Result<Vec<ScheduleEvent>, ProviderError> {
        let url = format!("{}/{}.json", self.base_url, year);
        let key = format!("schedule_{}", year);

        let value = self.get_json(&url, CacheCategory::Schedule, &key).await?;
        let response: ErgastResponse = serde_json::from_value(value)?;

        let races = response.mr_data.race_table.races;
        if races.is_empty() {
            return Err(ProviderError::UnknownSeason { year });
        }

        // An event with an unparseable date can't be placed on the
        // calendar; dropping it keeps it out of the completed-round
        // window rather than pinning it to some made-up date.
        let events = races
            .iter()
            .filter_map(|race| {
                match parse_event_date(&race.date, race.time.as_deref()) {
                    Some(date) => Some(map_event(race, date)),
                    None => {
                        warn!(
                            "Skipping {} round {}: unparseable event date {:?}",
                            year, race.round, race.date
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(events)
    }

    async fn fetch_race_result(
        &self,
        year: i32,
        round: u32,
    ) -> Result<RaceResult, ProviderError> {
        let url = format!("{}/{}/{}/results.json", self.base_url, year, round);
        let key = format!("results_{}_{}", year, round);

        let value = self.get_json(&url, CacheCategory::RaceResult, &key).await?;
        let response: ErgastResponse = serde_json::from_value(value)?;

        let race = response
            .mr_data
            .race_table
            .races
            .into_iter()
            .next()
            .ok_or(ProviderError::NotFound { year, round })?;

        if race.results.is_empty() {
            return Err(ProviderError::NotFound { year, round });
        }

        // The race demonstrably happened (it has results), so a bad date
        // only degrades the displayed header.
        let date = parse_event_date(&race.date, race.time.as_deref()).unwrap_or_else(|| {
            warn!(
                "Unparseable event date {:?} for {} round {}",
                race.date, year, round
            );
            chrono::DateTime::UNIX_EPOCH
        });

        let event = map_event(&race, date);
        let rows: Vec<RaceResultRow> = race.results.iter().map(map_result_row).collect();
        let fastest_lap = map_fastest_lap(&race.results);

        Ok(RaceResult {
            event,
            rows,
            fastest_lap,
        })
    }
}

// === Wire types ===
//
// The API nests everything under MRData and serves all numerics as
// strings.

#[derive(Debug, Deserialize)]
struct ErgastResponse {
    #[serde(rename = "MRData")]
    mr_data: MrData,
}

#[derive(Debug, Deserialize)]
struct MrData {
    #[serde(rename = "RaceTable")]
    race_table: RaceTable,
}

#[derive(Debug, Deserialize)]
struct RaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<WireRace>,
}

#[derive(Debug, Deserialize)]
struct WireRace {
    round: String,
    #[serde(rename = "raceName")]
    race_name: String,
    #[serde(rename = "Circuit")]
    circuit: WireCircuit,
    date: String,
    time: Option<String>,
    #[serde(rename = "Results", default)]
    results: Vec<WireResult>,
}

#[derive(Debug, Deserialize)]
struct WireCircuit {
    #[serde(rename = "circuitName")]
    circuit_name: String,
    #[serde(rename = "Location")]
    location: WireLocation,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    locality: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(rename = "positionText")]
    position_text: String,
    points: String,
    status: String,
    #[serde(rename = "Driver")]
    driver: WireDriver,
    #[serde(rename = "Constructor")]
    constructor: WireConstructor,
    #[serde(rename = "FastestLap")]
    fastest_lap: Option<WireFastestLap>,
}

#[derive(Debug, Deserialize)]
struct WireDriver {
    /// Three-letter abbreviation; absent for some historical seasons.
    code: Option<String>,
    #[serde(rename = "givenName")]
    given_name: String,
    #[serde(rename = "familyName")]
    family_name: String,
}

#[derive(Debug, Deserialize)]
struct WireConstructor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireFastestLap {
    rank: Option<String>,
    lap: String,
    #[serde(rename = "Time")]
    time: Option<WireLapTime>,
    #[serde(rename = "AverageSpeed")]
    average_speed: Option<WireAverageSpeed>,
}

#[derive(Debug, Deserialize)]
struct WireLapTime {
    time: String,
}

#[derive(Debug, Deserialize)]
struct WireAverageSpeed {
    speed: String,
}

// === Mapping ===

fn map_event(race: &WireRace, date: chrono::DateTime<Utc>) -> ScheduleEvent {
    ScheduleEvent {
        round: race.round.parse().unwrap_or(0),
        name: race.race_name.clone(),
        circuit: race.circuit.circuit_name.clone(),
        locality: race.circuit.location.locality.clone(),
        country: race.circuit.location.country.clone(),
        date,
    }
}

/// Combine the API's date and optional time into a UTC timestamp.
///
/// An unparseable date yields `None`; a missing or unparseable time
/// defaults to midnight.
fn parse_event_date(date: &str, time: Option<&str>) -> Option<chrono::DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;

    let clock = time
        .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M:%SZ").ok())
        .unwrap_or(NaiveTime::MIN);

    Some(Utc.from_utc_datetime(&day.and_time(clock)))
}

fn map_result_row(result: &WireResult) -> RaceResultRow {
    RaceResultRow {
        driver: driver_abbreviation(&result.driver),
        full_name: format!("{} {}", result.driver.given_name, result.driver.family_name),
        team: result.constructor.name.clone(),
        position: result.position_text.parse().ok(),
        status: ClassifiedStatus::from(result.status.as_str()),
        raw_status: result.status.clone(),
        points: result.points.parse().unwrap_or(0.0),
    }
}

/// Driver abbreviation, falling back to the first three letters of the
/// family name for seasons where the API carries no code.
fn driver_abbreviation(driver: &WireDriver) -> String {
    match &driver.code {
        Some(code) => code.clone(),
        None => driver
            .family_name
            .chars()
            .filter(|c| c.is_alphabetic())
            .take(3)
            .collect::<String>()
            .to_uppercase(),
    }
}

/// The fastest lap of the race: the row ranked 1 by the API.
fn map_fastest_lap(results: &[WireResult]) -> Option<FastestLap> {
    results.iter().find_map(|result| {
        let fl = result.fastest_lap.as_ref()?;
        if fl.rank.as_deref() != Some("1") {
            return None;
        }

        Some(FastestLap {
            driver: driver_abbreviation(&result.driver),
            team: result.constructor.name.clone(),
            lap: fl.lap.parse().unwrap_or(0),
            time: fl
                .time
                .as_ref()
                .map(|t| t.time.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            average_speed: fl
                .average_speed
                .as_ref()
                .and_then(|s| s.speed.parse().ok()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULE_JSON: &str = r#"{
        "MRData": {
            "RaceTable": {
                "season": "2023",
                "Races": [
                    {
                        "season": "2023",
                        "round": "1",
                        "raceName": "Bahrain Grand Prix",
                        "Circuit": {
                            "circuitId": "bahrain",
                            "circuitName": "Bahrain International Circuit",
                            "Location": {
                                "lat": "26.0325",
                                "long": "50.5106",
                                "locality": "Sakhir",
                                "country": "Bahrain"
                            }
                        },
                        "date": "2023-03-05",
                        "time": "15:00:00Z"
                    }
                ]
            }
        }
    }"#;

    const RESULTS_JSON: &str = r#"{
        "MRData": {
            "RaceTable": {
                "season": "2023",
                "round": "1",
                "Races": [
                    {
                        "season": "2023",
                        "round": "1",
                        "raceName": "Bahrain Grand Prix",
                        "Circuit": {
                            "circuitName": "Bahrain International Circuit",
                            "Location": {
                                "locality": "Sakhir",
                                "country": "Bahrain"
                            }
                        },
                        "date": "2023-03-05",
                        "time": "15:00:00Z",
                        "Results": [
                            {
                                "number": "1",
                                "position": "1",
                                "positionText": "1",
                                "points": "25",
                                "Driver": {
                                    "driverId": "max_verstappen",
                                    "code": "VER",
                                    "givenName": "Max",
                                    "familyName": "Verstappen"
                                },
                                "Constructor": { "name": "Red Bull" },
                                "grid": "1",
                                "laps": "57",
                                "status": "Finished",
                                "FastestLap": {
                                    "rank": "2",
                                    "lap": "44",
                                    "Time": { "time": "1:36.546" },
                                    "AverageSpeed": { "units": "kph", "speed": "201.819" }
                                }
                            },
                            {
                                "number": "31",
                                "position": "19",
                                "positionText": "R",
                                "points": "0",
                                "Driver": {
                                    "driverId": "ocon",
                                    "code": "OCO",
                                    "givenName": "Esteban",
                                    "familyName": "Ocon"
                                },
                                "Constructor": { "name": "Alpine" },
                                "grid": "9",
                                "laps": "41",
                                "status": "Retired",
                                "FastestLap": {
                                    "rank": "1",
                                    "lap": "38",
                                    "Time": { "time": "1:35.708" },
                                    "AverageSpeed": { "units": "kph", "speed": "203.501" }
                                }
                            }
                        ]
                    }
                ]
            }
        }
    }"#;

    #[test]
    fn test_decode_schedule() {
        let response: ErgastResponse = serde_json::from_str(SCHEDULE_JSON).unwrap();
        let races = &response.mr_data.race_table.races;
        assert_eq!(races.len(), 1);

        let race = &races[0];
        let date = parse_event_date(&race.date, race.time.as_deref()).unwrap();
        let event = map_event(race, date);
        assert_eq!(event.round, 1);
        assert_eq!(event.name, "Bahrain Grand Prix");
        assert_eq!(event.country, "Bahrain");
        assert_eq!(event.date, Utc.with_ymd_and_hms(2023, 3, 5, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_results() {
        let response: ErgastResponse = serde_json::from_str(RESULTS_JSON).unwrap();
        let race = &response.mr_data.race_table.races[0];

        let rows: Vec<_> = race.results.iter().map(map_result_row).collect();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].driver, "VER");
        assert_eq!(rows[0].full_name, "Max Verstappen");
        assert_eq!(rows[0].position, Some(1));
        assert_eq!(rows[0].points, 25.0);
        assert_eq!(rows[0].status, ClassifiedStatus::Finished);

        // "R" position text maps to no classified position.
        assert_eq!(rows[1].position, None);
        assert!(rows[1].status.is_dnf());
    }

    #[test]
    fn test_fastest_lap_takes_rank_one() {
        let response: ErgastResponse = serde_json::from_str(RESULTS_JSON).unwrap();
        let race = &response.mr_data.race_table.races[0];

        let fastest = map_fastest_lap(&race.results).unwrap();
        assert_eq!(fastest.driver, "OCO");
        assert_eq!(fastest.lap, 38);
        assert_eq!(fastest.time, "1:35.708");
        assert_eq!(fastest.average_speed, Some(203.501));
    }

    #[test]
    fn test_abbreviation_fallback_without_code() {
        let driver = WireDriver {
            code: None,
            given_name: "Juan Manuel".to_string(),
            family_name: "Fangio".to_string(),
        };
        assert_eq!(driver_abbreviation(&driver), "FAN");
    }

    #[test]
    fn test_event_date_without_time() {
        let date = parse_event_date("1957-08-04", None).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(1957, 8, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unparseable_event_date_is_rejected() {
        assert!(parse_event_date("TBC", None).is_none());
        assert!(parse_event_date("2023-13-45", Some("15:00:00Z")).is_none());
    }

    #[test]
    fn test_provider_builds_with_configured_client() {
        let provider = ErgastProvider::with_base_url(DEFAULT_BASE_URL.to_string())
            .and_then(|p| p.with_timeout(Duration::from_secs(5)));
        assert!(provider.is_ok());
    }

    #[test]
    fn test_empty_race_table_decodes() {
        let json = r#"{"MRData": {"RaceTable": {"season": "1949"}}}"#;
        let response: ErgastResponse = serde_json::from_str(json).unwrap();
        assert!(response.mr_data.race_table.races.is_empty());
    }
}
