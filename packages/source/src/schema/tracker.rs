//! COVID-19 Tracker Canada schema.
//!
//! Health region metadata: `GET {base}/regions/{code}`.
//! Reports: `GET {base}/reports/regions/{code}`, `{base}/reports/province/{code}`
//! and `{base}/reports`, each with `stat=cases&fill_dates=true&after={date}`.
//! Days carry a direct `change_cases` field that may be `null`.

use chrono::NaiveDate;
use covid_widget_source_models::ProviderDefinition;
use covid_widget_summary_models::{DailyPoint, GeoLevel};
use serde::Deserialize;

use super::{ParsedReport, SchemaAdapter, SubRegionInfo, schema_error};
use crate::SourceError;
use crate::parsing::{lenient_count, non_negative, parse_day, parse_last_updated};
use crate::trend::new_cases_from_cumulative;

/// Adapter for the tracker `/reports` endpoints.
pub struct TrackerAdapter;

#[derive(Debug, Deserialize)]
struct RegionMetadata {
    data: RegionMetadataData,
}

#[derive(Debug, Deserialize)]
struct RegionMetadataData {
    #[serde(default)]
    engname: Option<String>,
    province: String,
}

#[derive(Debug, Deserialize)]
struct TrackerReport {
    last_updated: String,
    data: Vec<TrackerDay>,
}

#[derive(Debug, Deserialize)]
struct TrackerDay {
    date: String,
    #[serde(default, deserialize_with = "lenient_count")]
    change_cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    total_cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    change_tests: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    total_tests: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    change_fatalities: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    total_fatalities: Option<i64>,
}

impl SchemaAdapter for TrackerAdapter {
    fn metadata_url(&self, provider: &ProviderDefinition, sub_region: &str) -> Option<String> {
        Some(format!("{}/regions/{sub_region}", provider.base_url))
    }

    fn report_url(
        &self,
        provider: &ProviderDefinition,
        level: GeoLevel,
        code: &str,
        after: NaiveDate,
    ) -> String {
        let path = match level {
            GeoLevel::SubRegion => format!("reports/regions/{code}"),
            GeoLevel::Region => format!("reports/province/{code}"),
            GeoLevel::Country => "reports".to_string(),
        };
        format!(
            "{}/{path}?stat=cases&fill_dates=true&after={}",
            provider.base_url,
            after.format("%Y-%m-%d")
        )
    }

    fn describe_sub_region(
        &self,
        code: &str,
        metadata: Option<&serde_json::Value>,
        _report: &serde_json::Value,
    ) -> Result<SubRegionInfo, SourceError> {
        let metadata = metadata.ok_or_else(|| SourceError::Schema {
            message: format!("health region {code}: metadata was not fetched"),
        })?;
        let parsed = RegionMetadata::deserialize(metadata)
            .map_err(|e| schema_error("tracker region metadata", &e))?;

        Ok(SubRegionInfo {
            name: parsed
                .data
                .engname
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| code.to_string()),
            region: parsed.data.province.to_uppercase(),
        })
    }

    fn parse_report(
        &self,
        provider: &ProviderDefinition,
        raw: &serde_json::Value,
    ) -> Result<ParsedReport, SourceError> {
        let mut report =
            TrackerReport::deserialize(raw).map_err(|e| schema_error("tracker report", &e))?;
        let last_updated =
            parse_last_updated(&report.last_updated, provider.assumed_zone.as_deref())?;

        let mut days = Vec::with_capacity(report.data.len());
        for day in report.data.drain(..) {
            days.push((parse_day(&day.date)?, day));
        }
        days.sort_by_key(|(date, _)| *date);

        let mut points = Vec::with_capacity(days.len());
        let mut previous_total: Option<i64> = None;
        for (date, day) in days {
            let new_cases = match (day.change_cases, day.total_cases, previous_total) {
                (Some(change), _, _) => u64::try_from(change.max(0)).unwrap_or(0),
                (None, Some(today), Some(yesterday)) => new_cases_from_cumulative(today, yesterday),
                (None, _, _) => {
                    log::debug!("tracker: no change_cases for {date}, counting as 0");
                    0
                }
            };
            if day.total_cases.is_some() {
                previous_total = day.total_cases;
            }

            points.push(DailyPoint {
                date,
                new_cases,
                cumulative_cases: non_negative(day.total_cases),
                active_cases: None,
                new_tests: day.change_tests,
                cumulative_tests: day.total_tests,
                new_deaths: day.change_fatalities,
                cumulative_deaths: day.total_fatalities,
            });
        }

        Ok(ParsedReport {
            last_updated,
            points,
        })
    }
}
