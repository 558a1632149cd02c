//! Sequential per-level fetch and normalization.
//!
//! Requests run one after another: sub-region (optional), region, country.
//! The first failure aborts the whole sequence so callers never see a
//! partial result set.

use chrono::{Days, NaiveDate};
use covid_widget_source_models::{ProviderDefinition, RegionRequest};
use covid_widget_summary_models::{CaseSummary, GeoLevel};

use crate::schema::{Area, adapter_for};
use crate::{JsonClient, SourceError, provinces};

/// Length of the trailing window in days.
pub const WINDOW_DAYS: u64 = 7;

/// First day of the trailing window ending on `today`.
#[must_use]
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(WINDOW_DAYS)).unwrap_or(today)
}

/// Fetches and normalizes one summary per requested level.
///
/// The result is ordered sub-region (if requested), region, country. When
/// the request has no region code, it is taken from the sub-region's
/// metadata.
///
/// # Errors
///
/// Returns the first [`SourceError`] raised by any request or adapter.
pub async fn fetch_summaries(
    client: &dyn JsonClient,
    provider: &ProviderDefinition,
    request: &RegionRequest,
    after: NaiveDate,
) -> Result<Vec<CaseSummary>, SourceError> {
    let adapter = adapter_for(provider.schema);
    let mut summaries = Vec::with_capacity(request.level_count());
    let mut region = request.region.clone();

    if let Some(code) = &request.sub_region {
        let metadata = match adapter.metadata_url(provider, code) {
            Some(url) => Some(client.get_json(&url).await?),
            None => None,
        };
        let raw = client
            .get_json(&adapter.report_url(provider, GeoLevel::SubRegion, code, after))
            .await?;

        let info = adapter.describe_sub_region(code, metadata.as_ref(), &raw)?;
        if region.is_none() {
            log::debug!("Health region {code} belongs to {}", info.region);
            region = Some(info.region);
        }

        let area = Area {
            level: GeoLevel::SubRegion,
            short_label: code.clone(),
            long_label: info.name,
        };
        summaries.push(adapter.normalize(provider, area, &raw)?);
    }

    let region = region.ok_or_else(|| SourceError::Schema {
        message: "no region code requested or resolved".to_string(),
    })?;
    let raw = client
        .get_json(&adapter.report_url(provider, GeoLevel::Region, &region, after))
        .await?;
    let area = Area {
        level: GeoLevel::Region,
        long_label: provinces::display_name(&region).map_or_else(|| region.clone(), String::from),
        short_label: region,
    };
    summaries.push(adapter.normalize(provider, area, &raw)?);

    let raw = client
        .get_json(&adapter.report_url(
            provider,
            GeoLevel::Country,
            &provider.country.code,
            after,
        ))
        .await?;
    let area = Area {
        level: GeoLevel::Country,
        short_label: provider.country.short_label.clone(),
        long_label: provider.country.long_label.clone(),
    };
    summaries.push(adapter.normalize(provider, area, &raw)?);

    log::info!(
        "Fetched {} summaries from {}: {}",
        summaries.len(),
        provider.name,
        summaries
            .iter()
            .map(|s| s.short_label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(summaries)
}
