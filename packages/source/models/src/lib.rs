#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Provider configuration types and the resolved region request.
//!
//! A [`ProviderDefinition`] is loaded from an embedded TOML file and tells
//! the fetcher where to send requests and which [`ProviderSchema`] adapter
//! understands the responses.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Response schema spoken by a provider.
///
/// Each variant has exactly one adapter in the source crate. Providers that
/// changed their response shape over time get one variant per shape.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderSchema {
    /// `/regions` + `/reports` endpoints with direct `change_cases` fields
    Tracker,
    /// `/summary?loc=` responses with a direct daily `cases` field and
    /// long province names
    OpenCovidLegacy,
    /// `/summary?geo=` responses carrying only cumulative counts
    OpenCovid,
}

/// Labels and query code for the country-wide level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    /// Value sent to the provider when asking for country totals
    /// (e.g. `"canada"`). Ignored by schemas with a dedicated endpoint.
    pub code: String,
    /// Short label for the country summary (e.g. `"CA"`).
    pub short_label: String,
    /// Long label for the country summary (e.g. `"Canada"`).
    pub long_label: String,
}

/// A configured upstream data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDefinition {
    /// Unique identifier (e.g. `"covid19tracker"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Base URL every endpoint is appended to, without a trailing slash.
    pub base_url: String,
    /// Which adapter parses this provider's responses.
    pub schema: ProviderSchema,
    /// Zone abbreviation applied to last-updated markers that carry none.
    #[serde(default)]
    pub assumed_zone: Option<String>,
    /// Country-level labels.
    pub country: CountryInfo,
}

/// Which areas to query, after interpreting the user's parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRequest {
    /// Health region code, when a health region was requested.
    pub sub_region: Option<String>,
    /// Province/territory code. `None` means it must be resolved from the
    /// sub-region's metadata.
    pub region: Option<String>,
}

impl RegionRequest {
    /// Number of summaries a successful fetch produces for this request.
    #[must_use]
    pub const fn level_count(&self) -> usize {
        if self.sub_region.is_some() { 3 } else { 2 }
    }
}
