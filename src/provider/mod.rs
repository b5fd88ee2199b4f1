//! Race data provider boundary.
//!
//! Everything upstream of the aggregator lives behind the
//! [`RaceDataProvider`] trait: schedule enumeration and per-round result
//! fetching. The shipped implementation talks to the Jolpica/Ergast API.

pub mod cache;
pub mod ergast;

pub use cache::{Cache, CacheCategory};
pub use ergast::ErgastProvider;

use crate::models::{RaceResult, ScheduleEvent};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a race data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connection, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("API returned HTTP {code}")]
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// The response body could not be decoded.
    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The season is unknown to the provider.
    #[error("no schedule data for season {year}")]
    UnknownSeason {
        /// Season year.
        year: i32,
    },

    /// The requested session does not exist or has not been held yet.
    #[error("no result data for {year} round {round}")]
    NotFound {
        /// Season year.
        year: i32,
        /// Round number.
        round: u32,
    },
}

/// Source of schedules and race results.
///
/// `list_rounds` failing aborts that year's processing; a
/// `fetch_race_result` failure only skips that round.
#[async_trait]
pub trait RaceDataProvider: Send + Sync {
    /// The season calendar for `year`, in ascending round order.
    async fn list_rounds(&self, year: i32) -> Result<Vec<ScheduleEvent>, ProviderError>;

    /// The finishing result set for one race.
    async fn fetch_race_result(&self, year: i32, round: u32)
        -> Result<RaceResult, ProviderError>;
}
