//! Open data working group summary schema, current version.
//!
//! `GET {base}/summary?version=true&geo={hr|pt|can}&loc={code}&after={date}`
//! with short health region and province names. Days only carry cumulative
//! counts, so daily figures are differences between consecutive days and the
//! earliest day in the response only seeds the first difference.

use chrono::NaiveDate;
use covid_widget_source_models::ProviderDefinition;
use covid_widget_summary_models::{DailyPoint, GeoLevel};
use serde::Deserialize;

use super::{ParsedReport, SchemaAdapter, SubRegionInfo, schema_error};
use crate::SourceError;
use crate::parsing::{lenient_count, non_negative, parse_day, parse_last_updated};
use crate::provinces;
use crate::trend::new_cases_from_cumulative;

/// Adapter for the cumulative-only `/summary` schema.
pub struct OpenCovidAdapter;

#[derive(Debug, Deserialize)]
struct SummaryReport {
    version: String,
    data: Vec<SummaryDay>,
}

#[derive(Debug, Deserialize)]
struct SummaryDay {
    date: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    sub_region_1: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    deaths: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    tests_completed: Option<i64>,
}

const fn geo_param(level: GeoLevel) -> &'static str {
    match level {
        GeoLevel::SubRegion => "hr",
        GeoLevel::Region => "pt",
        GeoLevel::Country => "can",
    }
}

fn parse(raw: &serde_json::Value) -> Result<SummaryReport, SourceError> {
    SummaryReport::deserialize(raw).map_err(|e| schema_error("summary", &e))
}

fn difference(today: Option<i64>, yesterday: Option<i64>) -> Option<i64> {
    Some(today?.saturating_sub(yesterday?))
}

impl SchemaAdapter for OpenCovidAdapter {
    fn report_url(
        &self,
        provider: &ProviderDefinition,
        level: GeoLevel,
        code: &str,
        after: NaiveDate,
    ) -> String {
        let loc = match level {
            GeoLevel::Country => String::new(),
            GeoLevel::SubRegion | GeoLevel::Region => format!("&loc={code}"),
        };
        format!(
            "{}/summary?version=true&geo={}{loc}&after={}&hr_names=short&pt_names=short",
            provider.base_url,
            geo_param(level),
            after.format("%Y-%m-%d")
        )
    }

    fn describe_sub_region(
        &self,
        code: &str,
        _metadata: Option<&serde_json::Value>,
        report: &serde_json::Value,
    ) -> Result<SubRegionInfo, SourceError> {
        let parsed = parse(report)?;
        let day = parsed.data.last().ok_or_else(|| SourceError::Schema {
            message: format!("health region {code}: empty summary"),
        })?;

        let region_name = day.region.as_deref().unwrap_or_default();
        let region = provinces::code_for(region_name).ok_or_else(|| SourceError::Schema {
            message: format!("health region {code}: unknown region {region_name:?}"),
        })?;

        Ok(SubRegionInfo {
            name: day
                .sub_region_1
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| code.to_string()),
            region: region.to_string(),
        })
    }

    fn parse_report(
        &self,
        provider: &ProviderDefinition,
        raw: &serde_json::Value,
    ) -> Result<ParsedReport, SourceError> {
        let report = parse(raw)?;
        let last_updated = parse_last_updated(&report.version, provider.assumed_zone.as_deref())?;

        let mut days = report
            .data
            .into_iter()
            .map(|day| Ok((parse_day(&day.date)?, day)))
            .collect::<Result<Vec<_>, SourceError>>()?;
        days.sort_by_key(|(date, _)| *date);

        let points = days
            .windows(2)
            .map(|pair| {
                let (_, yesterday) = &pair[0];
                let (date, today) = &pair[1];
                let new_cases = match (today.cases, yesterday.cases) {
                    (Some(t), Some(y)) => new_cases_from_cumulative(t, y),
                    _ => 0,
                };
                DailyPoint {
                    date: *date,
                    new_cases,
                    cumulative_cases: non_negative(today.cases),
                    active_cases: None,
                    new_tests: difference(today.tests_completed, yesterday.tests_completed),
                    cumulative_tests: today.tests_completed,
                    new_deaths: difference(today.deaths, yesterday.deaths),
                    cumulative_deaths: today.deaths,
                }
            })
            .collect();

        Ok(ParsedReport {
            last_updated,
            points,
        })
    }
}
