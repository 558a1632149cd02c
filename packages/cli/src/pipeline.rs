//! Fetch → cache pipeline.
//!
//! Resolves the region parameter, fetches live summaries, and writes them to
//! the cache. When any part of the live fetch fails, the cached set is served
//! instead; when that fails too, the outcome is
//! [`PipelineOutcome::Unavailable`].

use chrono::NaiveDate;
use covid_widget_cache::CacheStore;
use covid_widget_source::fetch::{fetch_summaries, window_start};
use covid_widget_source::params::{RegionDefaults, resolve_parameter};
use covid_widget_source::{JsonClient, SourceError};
use covid_widget_source_models::{ProviderDefinition, RegionRequest};
use covid_widget_summary_models::{CaseSummary, GeoLevel};

/// Everything one invocation needs, passed explicitly.
pub struct PipelineContext<'a> {
    /// HTTP seam.
    pub client: &'a dyn JsonClient,
    /// Selected provider.
    pub provider: &'a ProviderDefinition,
    /// Cache slot.
    pub cache: &'a CacheStore,
    /// Defaults for an absent parameter.
    pub defaults: &'a RegionDefaults,
    /// Local date the trailing window ends on.
    pub today: NaiveDate,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Freshly fetched summaries.
    Live(Vec<CaseSummary>),
    /// Live fetch failed; these come from the cache.
    Cached {
        /// Cached summaries, unchanged.
        summaries: Vec<CaseSummary>,
        /// Why the live fetch failed.
        reason: String,
    },
    /// Neither live nor cached data is available.
    Unavailable {
        /// Why the live fetch and the cache read failed.
        reason: String,
    },
}

impl PipelineOutcome {
    /// Summaries to present, if any.
    #[must_use]
    pub fn summaries(&self) -> Option<&[CaseSummary]> {
        match self {
            Self::Live(summaries) | Self::Cached { summaries, .. } => Some(summaries),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Runs the pipeline for one optional region parameter.
///
/// # Errors
///
/// Returns [`SourceError::InvalidParameter`] for an unsupported parameter,
/// before any request is sent. Every other failure is absorbed into the
/// returned [`PipelineOutcome`].
pub async fn run(
    ctx: &PipelineContext<'_>,
    parameter: Option<&str>,
) -> Result<PipelineOutcome, SourceError> {
    let request = resolve_parameter(parameter, ctx.defaults)?;
    log::info!(
        "Requesting sub-region={} region={} from {}",
        request.sub_region.as_deref().unwrap_or("-"),
        request.region.as_deref().unwrap_or("(resolve)"),
        ctx.provider.name
    );

    let after = window_start(ctx.today);
    match fetch_summaries(ctx.client, ctx.provider, &request, after).await {
        Ok(summaries) => {
            if let Err(e) = ctx.cache.write(&summaries) {
                log::warn!("Failed to update cache: {e}");
            }
            Ok(PipelineOutcome::Live(summaries))
        }
        Err(fetch_err) => {
            log::warn!("Live fetch failed, falling back to cache: {fetch_err}");
            Ok(fall_back_to_cache(ctx.cache, &request, &fetch_err))
        }
    }
}

fn fall_back_to_cache(
    cache: &CacheStore,
    request: &RegionRequest,
    fetch_err: &SourceError,
) -> PipelineOutcome {
    match cache.read() {
        Ok(summaries) => {
            if !matches_request(&summaries, request) {
                log::warn!(
                    "Cached summaries ({}) were fetched for a different request",
                    summaries
                        .iter()
                        .map(|s| s.short_label.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            log::info!(
                "Serving {} cached summaries from {}",
                summaries.len(),
                cache.path().display()
            );
            PipelineOutcome::Cached {
                summaries,
                reason: fetch_err.to_string(),
            }
        }
        Err(cache_err) => {
            log::error!("No data available: {fetch_err}; {cache_err}");
            PipelineOutcome::Unavailable {
                reason: format!("{fetch_err}; {cache_err}"),
            }
        }
    }
}

/// Whether a cached set has the levels and labels `request` asks for.
///
/// A request without an explicit region accepts any cached region.
#[must_use]
pub fn matches_request(summaries: &[CaseSummary], request: &RegionRequest) -> bool {
    let label_at = |level: GeoLevel| {
        summaries
            .iter()
            .find(|s| s.level == level)
            .map(|s| s.short_label.as_str())
    };

    let sub_region_ok = match (&request.sub_region, label_at(GeoLevel::SubRegion)) {
        (Some(wanted), Some(cached)) => wanted == cached,
        (None, None) => true,
        _ => false,
    };
    let region_ok = match (&request.region, label_at(GeoLevel::Region)) {
        (Some(wanted), Some(cached)) => wanted.eq_ignore_ascii_case(cached),
        (None, Some(_)) => true,
        (_, None) => false,
    };

    sub_region_ok && region_ok && summaries.len() == request.level_count()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use covid_widget_source::registry::find_provider;
    use covid_widget_summary_models::TrendDirection;
    use serde_json::json;

    use super::*;

    struct CannedClient {
        bodies: BTreeMap<String, serde_json::Value>,
        calls: Mutex<usize>,
    }

    impl CannedClient {
        fn new(bodies: Vec<(String, serde_json::Value)>) -> Self {
            Self {
                bodies: bodies.into_iter().collect(),
                calls: Mutex::new(0),
            }
        }

        fn offline() -> Self {
            Self::new(Vec::new())
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl JsonClient for CannedClient {
        async fn get_json(&self, url: &str) -> Result<serde_json::Value, SourceError> {
            *self.calls.lock().unwrap() += 1;
            self.bodies.get(url).cloned().ok_or_else(|| SourceError::Schema {
                message: format!("connection refused: {url}"),
            })
        }
    }

    fn cache_in(name: &str) -> (PathBuf, CacheStore) {
        let dir = std::env::temp_dir().join(format!("covid_widget_pipeline_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        let store = CacheStore::new(dir.join("summaries.json"));
        (dir, store)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()
    }

    /// Seven days of tracker data ending 2021-03-14.
    fn report(daily: &[i64]) -> serde_json::Value {
        let mut total = 5_000;
        let data: Vec<serde_json::Value> = daily
            .iter()
            .enumerate()
            .map(|(i, &change)| {
                total += change;
                json!({
                    "date": format!("2021-03-{:02}", 8 + i),
                    "change_cases": change,
                    "total_cases": total,
                })
            })
            .collect();
        json!({"last_updated": "2021-03-15 20:56:03", "data": data})
    }

    fn tracker_bodies() -> Vec<(String, serde_json::Value)> {
        let base = "https://api.covid19tracker.ca";
        let q = "stat=cases&fill_dates=true&after=2021-03-08";
        vec![
            (
                format!("{base}/regions/4601"),
                json!({"data": {"province": "MB", "engname": "Winnipeg"}}),
            ),
            (
                format!("{base}/reports/regions/4601?{q}"),
                report(&[12, 15, 9, 14, 11, 13, 40]),
            ),
            (
                format!("{base}/reports/province/MB?{q}"),
                report(&[80, 75, 90, 85, 70, 65, 60]),
            ),
            (
                format!("{base}/reports?{q}"),
                report(&[3_000, 2_800, 3_100, 2_900, 3_050, 2_950, 3_300]),
            ),
        ]
    }

    #[tokio::test]
    async fn live_fetch_is_cached() {
        let (dir, cache) = cache_in("live");
        let provider = find_provider("covid19tracker").unwrap();
        let client = CannedClient::new(tracker_bodies());
        let defaults = RegionDefaults::default();
        let ctx = PipelineContext {
            client: &client,
            provider: &provider,
            cache: &cache,
            defaults: &defaults,
            today: today(),
        };

        let outcome = run(&ctx, Some("4601")).await.unwrap();

        let PipelineOutcome::Live(summaries) = outcome else {
            panic!("expected live outcome");
        };
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].new_cases, 40);
        assert_eq!(summaries[0].trend_direction, TrendDirection::Up);
        assert_eq!(cache.read().unwrap(), summaries);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn network_failure_serves_cache_unchanged() {
        let (dir, cache) = cache_in("fallback");
        let provider = find_provider("covid19tracker").unwrap();
        let defaults = RegionDefaults::default();

        let online = CannedClient::new(tracker_bodies());
        let ctx = PipelineContext {
            client: &online,
            provider: &provider,
            cache: &cache,
            defaults: &defaults,
            today: today(),
        };
        let Ok(PipelineOutcome::Live(fetched)) = run(&ctx, Some("4601")).await else {
            panic!("seeding the cache failed");
        };

        let offline = CannedClient::offline();
        let ctx = PipelineContext {
            client: &offline,
            ..ctx
        };
        let outcome = run(&ctx, Some("4601")).await.unwrap();

        let PipelineOutcome::Cached { summaries, reason } = outcome else {
            panic!("expected cached outcome");
        };
        assert_eq!(summaries, fetched);
        assert_eq!(
            summaries[0].last_updated.to_rfc3339(),
            "2021-03-15T20:56:03-05:00"
        );
        assert!(reason.contains("connection refused"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn no_network_and_no_cache_is_unavailable() {
        let (dir, cache) = cache_in("unavailable");
        let provider = find_provider("covid19tracker").unwrap();
        let client = CannedClient::offline();
        let defaults = RegionDefaults::default();
        let ctx = PipelineContext {
            client: &client,
            provider: &provider,
            cache: &cache,
            defaults: &defaults,
            today: today(),
        };

        let outcome = run(&ctx, None).await.unwrap();
        assert!(matches!(outcome, PipelineOutcome::Unavailable { .. }));
        assert!(outcome.summaries().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn invalid_parameter_sends_no_requests() {
        let (dir, cache) = cache_in("invalid");
        let provider = find_provider("covid19tracker").unwrap();
        let client = CannedClient::new(tracker_bodies());
        let defaults = RegionDefaults::default();
        let ctx = PipelineContext {
            client: &client,
            provider: &provider,
            cache: &cache,
            defaults: &defaults,
            today: today(),
        };

        let err = run(&ctx, Some("Winnipeg")).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidParameter { .. }));
        assert_eq!(client.calls(), 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unwritable_cache_does_not_block_live_data() {
        let (dir, _) = cache_in("unwritable");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let cache = CacheStore::new(blocker.join("summaries.json"));

        let provider = find_provider("covid19tracker").unwrap();
        let client = CannedClient::new(tracker_bodies());
        let defaults = RegionDefaults::default();
        let ctx = PipelineContext {
            client: &client,
            provider: &provider,
            cache: &cache,
            defaults: &defaults,
            today: today(),
        };

        let outcome = run(&ctx, Some("MB")).await.unwrap();
        assert!(matches!(outcome, PipelineOutcome::Live(ref s) if s.len() == 2));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn shape_check_compares_levels_and_labels() {
        let summary = |level, label: &str| CaseSummary {
            level,
            short_label: label.to_string(),
            long_label: label.to_string(),
            last_updated: chrono::DateTime::parse_from_rfc3339("2021-03-15T20:56:03-05:00")
                .unwrap(),
            new_cases: 1,
            active_cases: None,
            total_cases: 1,
            trend_direction: TrendDirection::Down,
            timeseries: Vec::new(),
        };
        let cached = vec![
            summary(GeoLevel::SubRegion, "4601"),
            summary(GeoLevel::Region, "MB"),
            summary(GeoLevel::Country, "CA"),
        ];

        let same = RegionRequest {
            sub_region: Some("4601".to_string()),
            region: None,
        };
        let other_hr = RegionRequest {
            sub_region: Some("3595".to_string()),
            region: None,
        };
        let region_only = RegionRequest {
            sub_region: None,
            region: Some("MB".to_string()),
        };

        assert!(matches_request(&cached, &same));
        assert!(!matches_request(&cached, &other_hr));
        assert!(!matches_request(&cached, &region_only));
        assert!(matches_request(&cached[1..], &region_only));
    }

    #[tokio::test]
    async fn default_health_region_takes_province_from_metadata() {
        let (dir, cache) = cache_in("default_hr_province");
        let provider = find_provider("covid19tracker").unwrap();
        let config = crate::config::WidgetConfig::from_lookup(
            |key| (key == crate::config::ENV_SUB_REGION).then(|| "3595".to_string()),
            crate::config::ConfigOverrides::default(),
        );

        let base = "https://api.covid19tracker.ca";
        let q = "stat=cases&fill_dates=true&after=2021-03-08";
        let client = CannedClient::new(vec![
            (
                format!("{base}/regions/3595"),
                json!({"data": {"province": "ON", "engname": "Toronto"}}),
            ),
            (
                format!("{base}/reports/regions/3595?{q}"),
                report(&[300, 310, 290, 305, 320, 315, 400]),
            ),
            (
                format!("{base}/reports/province/ON?{q}"),
                report(&[1_000, 1_100, 1_050, 1_200, 1_150, 1_100, 1_300]),
            ),
            (
                format!("{base}/reports?{q}"),
                report(&[3_000, 2_800, 3_100, 2_900, 3_050, 2_950, 3_300]),
            ),
        ]);
        let ctx = PipelineContext {
            client: &client,
            provider: &provider,
            cache: &cache,
            defaults: &config.defaults,
            today: today(),
        };

        let outcome = run(&ctx, None).await.unwrap();

        let PipelineOutcome::Live(summaries) = outcome else {
            panic!("expected live outcome");
        };
        assert_eq!(summaries[0].short_label, "3595");
        assert_eq!(summaries[0].long_label, "Toronto");
        assert_eq!(summaries[1].short_label, "ON");
        assert_eq!(summaries[1].long_label, "Ontario");
        assert_eq!(client.calls(), 4);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
