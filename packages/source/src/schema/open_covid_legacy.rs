//! Open data working group summary schema, first version.
//!
//! `GET {base}/summary?version=true&loc={code}&after={date}` returns
//! `{"summary": [...], "version": "YYYY-MM-DD HH:MM EDT"}`. Each day has a
//! direct daily `cases` field, `active_cases`, and long province names.

use chrono::NaiveDate;
use covid_widget_source_models::ProviderDefinition;
use covid_widget_summary_models::{DailyPoint, GeoLevel};
use serde::Deserialize;

use super::{ParsedReport, SchemaAdapter, SubRegionInfo, schema_error};
use crate::SourceError;
use crate::parsing::{lenient_count, non_negative, parse_day, parse_last_updated};
use crate::provinces;

/// Adapter for the first `/summary` schema.
pub struct OpenCovidLegacyAdapter;

#[derive(Debug, Deserialize)]
struct LegacyReport {
    version: String,
    summary: Vec<LegacyDay>,
}

#[derive(Debug, Deserialize)]
struct LegacyDay {
    date: String,
    #[serde(default)]
    health_region: Option<String>,
    #[serde(default)]
    province: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    cumulative_cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    active_cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    testing: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    cumulative_testing: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    deaths: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    cumulative_deaths: Option<i64>,
}

fn parse(raw: &serde_json::Value) -> Result<LegacyReport, SourceError> {
    LegacyReport::deserialize(raw).map_err(|e| schema_error("legacy summary", &e))
}

impl SchemaAdapter for OpenCovidLegacyAdapter {
    fn report_url(
        &self,
        provider: &ProviderDefinition,
        _level: GeoLevel,
        code: &str,
        after: NaiveDate,
    ) -> String {
        format!(
            "{}/summary?version=true&loc={code}&after={}",
            provider.base_url,
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
        let day = parsed.summary.last().ok_or_else(|| SourceError::Schema {
            message: format!("health region {code}: empty summary"),
        })?;

        let province = day.province.as_deref().unwrap_or_default();
        let region = provinces::code_for(province).ok_or_else(|| SourceError::Schema {
            message: format!("health region {code}: unknown province {province:?}"),
        })?;

        Ok(SubRegionInfo {
            name: day
                .health_region
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

        let points = report
            .summary
            .into_iter()
            .map(|day| {
                Ok(DailyPoint {
                    date: parse_day(&day.date)?,
                    new_cases: non_negative(day.cases).unwrap_or(0),
                    cumulative_cases: non_negative(day.cumulative_cases),
                    active_cases: day.active_cases,
                    new_tests: day.testing,
                    cumulative_tests: day.cumulative_testing,
                    new_deaths: day.deaths,
                    cumulative_deaths: day.cumulative_deaths,
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        Ok(ParsedReport {
            last_updated,
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use covid_widget_source_models::ProviderSchema;
    use covid_widget_summary_models::TrendDirection;
    use serde_json::json;

    use super::*;
    use crate::schema::{Area, test_support::provider};

    fn sample() -> serde_json::Value {
        json!({
            "summary": [
                {"date": "12-03-2021", "health_region": "Winnipeg", "province": "Manitoba",
                 "cases": 60, "cumulative_cases": 20_000, "active_cases": 800,
                 "testing": "NULL", "deaths": 1, "cumulative_deaths": 500},
                {"date": "13-03-2021", "health_region": "Winnipeg", "province": "Manitoba",
                 "cases": 70, "cumulative_cases": 20_070, "active_cases": 790,
                 "testing": 1500, "deaths": 0, "cumulative_deaths": 500},
                {"date": "14-03-2021", "health_region": "Winnipeg", "province": "Manitoba",
                 "cases": 40, "cumulative_cases": 20_110, "active_cases": 760,
                 "testing": null, "deaths": 2, "cumulative_deaths": 502}
            ],
            "version": "2021-03-14 21:06 EDT"
        })
    }

    #[test]
    fn url_uses_loc_parameter() {
        let p = provider(ProviderSchema::OpenCovidLegacy, None);
        let url = OpenCovidLegacyAdapter.report_url(
            &p,
            GeoLevel::Region,
            "MB",
            NaiveDate::from_ymd_opt(2021, 3, 7).unwrap(),
        );
        assert_eq!(
            url,
            "https://example.invalid/summary?version=true&loc=MB&after=2021-03-07"
        );
    }

    #[test]
    fn resolves_province_from_long_name() {
        let info = OpenCovidLegacyAdapter
            .describe_sub_region("4601", None, &sample())
            .unwrap();
        assert_eq!(info.name, "Winnipeg");
        assert_eq!(info.region, "MB");
    }

    #[test]
    fn normalizes_direct_daily_cases() {
        let p = provider(ProviderSchema::OpenCovidLegacy, None);
        let area = Area {
            level: GeoLevel::SubRegion,
            short_label: "4601".to_string(),
            long_label: "Winnipeg".to_string(),
        };
        let summary = OpenCovidLegacyAdapter.normalize(&p, area, &sample()).unwrap();

        assert_eq!(summary.new_cases, 40);
        assert_eq!(summary.total_cases, 20_110);
        assert_eq!(summary.active_cases, Some(760));
        assert_eq!(summary.trend_direction, TrendDirection::Down);
        assert_eq!(summary.last_updated.to_rfc3339(), "2021-03-14T21:06:00-04:00");
        assert_eq!(summary.timeseries[0].new_tests, None);
        assert_eq!(summary.timeseries[1].new_tests, Some(1500));
        assert_eq!(summary.timeseries[2].new_tests, None);
    }

    #[test]
    fn unknown_zone_abbreviation_fails() {
        let mut raw = sample();
        raw["version"] = json!("2021-03-14 21:06 CST");
        let p = provider(ProviderSchema::OpenCovidLegacy, None);
        assert!(matches!(
            OpenCovidLegacyAdapter.parse_report(&p, &raw),
            Err(SourceError::TimestampParse { .. })
        ));
    }

    #[test]
    fn unknown_province_is_schema_error() {
        let raw = json!({
            "summary": [{"date": "14-03-2021", "health_region": "X", "province": "Atlantis"}],
            "version": "2021-03-14 21:06 EDT"
        });
        assert!(matches!(
            OpenCovidLegacyAdapter.describe_sub_region("9999", None, &raw),
            Err(SourceError::Schema { .. })
        ));
    }
}
