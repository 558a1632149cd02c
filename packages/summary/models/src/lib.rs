#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalized case summary records.
//!
//! Every upstream provider schema is mapped into one [`CaseSummary`] per
//! requested geography level. These records are what the cache persists and
//! what the presentation layer consumes, so they carry no provider-specific
//! fields.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Geography level a summary describes.
///
/// Levels are ordered finest to coarsest, which is also the order summaries
/// appear in a result set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GeoLevel {
    /// Health region (the finest level the providers expose)
    SubRegion,
    /// Province or territory
    Region,
    /// Country-wide totals
    Country,
}

/// Short-term direction of the daily case count.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    /// Latest day is strictly above the mean of the preceding days
    Up,
    /// Latest day is at or below the mean of the preceding days
    Down,
}

impl TrendDirection {
    /// Returns a single-character arrow for compact displays.
    #[must_use]
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
        }
    }
}

/// One day of statistics within a summary's trailing window.
///
/// `new_cases` is always derived and never negative. The remaining counts
/// are copied from the provider as-is and are `None` when the provider did
/// not report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    /// Calendar date the statistics belong to.
    pub date: NaiveDate,
    /// New cases reported for this day.
    pub new_cases: u64,
    /// Cumulative cases as of this day.
    pub cumulative_cases: Option<u64>,
    /// Active cases as of this day.
    pub active_cases: Option<i64>,
    /// Tests completed on this day.
    pub new_tests: Option<i64>,
    /// Cumulative tests completed.
    pub cumulative_tests: Option<i64>,
    /// Deaths reported on this day.
    pub new_deaths: Option<i64>,
    /// Cumulative deaths.
    pub cumulative_deaths: Option<i64>,
}

/// Normalized statistics for one geographic area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    /// Which geography level this summary covers.
    pub level: GeoLevel,
    /// Short area code (e.g. `"4601"`, `"MB"`, `"CA"`).
    pub short_label: String,
    /// Human-readable area name.
    pub long_label: String,
    /// When the upstream data was generated.
    pub last_updated: DateTime<FixedOffset>,
    /// New cases on the most recent day of the window.
    pub new_cases: u64,
    /// Active cases on the most recent day, when the schema reports them.
    pub active_cases: Option<i64>,
    /// Cumulative cases on the most recent day.
    pub total_cases: u64,
    /// Latest day compared against the mean of the preceding days.
    pub trend_direction: TrendDirection,
    /// Daily points in ascending date order. Never empty.
    pub timeseries: Vec<DailyPoint>,
}

impl CaseSummary {
    /// Returns the most recent point in the window.
    #[must_use]
    pub fn latest(&self) -> Option<&DailyPoint> {
        self.timeseries.last()
    }
}
