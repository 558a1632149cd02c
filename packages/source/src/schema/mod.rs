//! Per-schema adapters from raw provider JSON to [`CaseSummary`].
//!
//! An adapter knows a provider's URL layout and response shape. It parses a
//! report into a [`ParsedReport`]; [`build_summary`] then derives the fields
//! every schema shares (latest new cases, totals, trend).

pub mod open_covid;
pub mod open_covid_legacy;
pub mod tracker;

use chrono::{DateTime, FixedOffset, NaiveDate};
use covid_widget_source_models::{ProviderDefinition, ProviderSchema};
use covid_widget_summary_models::{CaseSummary, DailyPoint, GeoLevel};

use crate::SourceError;
use crate::trend::trend_direction;

/// Labels for the area a report describes, resolved before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    /// Geography level.
    pub level: GeoLevel,
    /// Short label (code).
    pub short_label: String,
    /// Long, human-readable label.
    pub long_label: String,
}

/// What a sub-region lookup reveals about the owning province.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRegionInfo {
    /// Human-readable health region name.
    pub name: String,
    /// Province/territory code the health region belongs to.
    pub region: String,
}

/// Schema-specific parse result, before shared derivations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReport {
    /// Provider's last-updated marker as a timestamp.
    pub last_updated: DateTime<FixedOffset>,
    /// Daily points, in any order.
    pub points: Vec<DailyPoint>,
}

/// Capability every provider schema implements.
pub trait SchemaAdapter: Send + Sync {
    /// URL of the sub-region metadata document, for schemas that need a
    /// separate lookup to learn a health region's name and province.
    fn metadata_url(&self, _provider: &ProviderDefinition, _sub_region: &str) -> Option<String> {
        None
    }

    /// URL of the per-day report for one area.
    fn report_url(
        &self,
        provider: &ProviderDefinition,
        level: GeoLevel,
        code: &str,
        after: NaiveDate,
    ) -> String;

    /// Extracts the health region name and owning province from the
    /// metadata document (if any) and the sub-region report.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Schema`] when the expected fields are absent.
    fn describe_sub_region(
        &self,
        code: &str,
        metadata: Option<&serde_json::Value>,
        report: &serde_json::Value,
    ) -> Result<SubRegionInfo, SourceError>;

    /// Parses a report into a timestamp and daily points.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Schema`] for an unexpected shape and
    /// [`SourceError::TimestampParse`] for an unrecognized marker.
    fn parse_report(
        &self,
        provider: &ProviderDefinition,
        raw: &serde_json::Value,
    ) -> Result<ParsedReport, SourceError>;

    /// Maps one raw report into a [`CaseSummary`] for `area`.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::parse_report`] and [`build_summary`] errors.
    fn normalize(
        &self,
        provider: &ProviderDefinition,
        area: Area,
        raw: &serde_json::Value,
    ) -> Result<CaseSummary, SourceError> {
        let report = self.parse_report(provider, raw)?;
        build_summary(area, report)
    }
}

/// Returns the adapter for a schema.
#[must_use]
pub fn adapter_for(schema: ProviderSchema) -> &'static dyn SchemaAdapter {
    match schema {
        ProviderSchema::Tracker => &tracker::TrackerAdapter,
        ProviderSchema::OpenCovidLegacy => &open_covid_legacy::OpenCovidLegacyAdapter,
        ProviderSchema::OpenCovid => &open_covid::OpenCovidAdapter,
    }
}

/// Sorts the window and derives the latest-day fields and trend.
///
/// # Errors
///
/// Returns [`SourceError::InsufficientData`] for fewer than two points and
/// [`SourceError::Schema`] if the latest point has no cumulative count.
pub fn build_summary(area: Area, report: ParsedReport) -> Result<CaseSummary, SourceError> {
    let mut timeseries = report.points;
    timeseries.sort_by_key(|p| p.date);

    let daily: Vec<u64> = timeseries.iter().map(|p| p.new_cases).collect();
    let trend = trend_direction(&daily)?;

    let latest = timeseries.last().ok_or(SourceError::InsufficientData {
        required: crate::trend::MIN_TREND_POINTS,
        available: 0,
    })?;
    let total_cases = latest.cumulative_cases.ok_or_else(|| SourceError::Schema {
        message: format!(
            "{} {}: latest day {} has no cumulative case count",
            area.level, area.short_label, latest.date
        ),
    })?;
    let new_cases = latest.new_cases;
    let active_cases = latest.active_cases;

    log::debug!(
        "{} {}: {new_cases} new, {total_cases} total, trend {trend} over {} days",
        area.level,
        area.short_label,
        timeseries.len()
    );

    Ok(CaseSummary {
        level: area.level,
        short_label: area.short_label,
        long_label: area.long_label,
        last_updated: report.last_updated,
        new_cases,
        active_cases,
        total_cases,
        trend_direction: trend,
        timeseries,
    })
}

/// Converts a deserialization failure into a schema error naming the shape.
pub(crate) fn schema_error(shape: &str, e: &serde_json::Error) -> SourceError {
    SourceError::Schema {
        message: format!("unexpected {shape} response: {e}"),
    }
}
