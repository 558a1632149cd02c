//! Interprets the single free-text region parameter.

use covid_widget_source_models::RegionRequest;

use crate::SourceError;

/// Minimum length of a numeric health region code.
const MIN_SUB_REGION_LEN: usize = 3;

/// Areas queried when no parameter is supplied.
///
/// With a health region set, its province always comes from the region's
/// metadata and `region` is not consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDefaults {
    /// Default health region code.
    pub sub_region: Option<String>,
    /// Province/territory code used when there is no default health region.
    pub region: String,
}

impl Default for RegionDefaults {
    fn default() -> Self {
        Self {
            sub_region: Some("4601".to_string()),
            region: "MB".to_string(),
        }
    }
}

/// Resolves the parameter into a [`RegionRequest`].
///
/// * absent or blank: the default health region, or the default province
///   when no health region is configured
/// * all digits, at least three characters: a health region; its province
///   is resolved later from the region's metadata
/// * exactly two characters: a province/territory code, upper-cased
///
/// # Errors
///
/// Returns [`SourceError::InvalidParameter`] for any other shape.
pub fn resolve_parameter(
    parameter: Option<&str>,
    defaults: &RegionDefaults,
) -> Result<RegionRequest, SourceError> {
    let Some(raw) = parameter.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(defaults.sub_region.as_ref().map_or_else(
            || RegionRequest {
                sub_region: None,
                region: Some(defaults.region.clone()),
            },
            |code| RegionRequest {
                sub_region: Some(code.clone()),
                region: None,
            },
        ));
    };

    if raw.len() >= MIN_SUB_REGION_LEN && raw.chars().all(|c| c.is_ascii_digit()) {
        return Ok(RegionRequest {
            sub_region: Some(raw.to_string()),
            region: None,
        });
    }

    if raw.chars().count() == 2 {
        return Ok(RegionRequest {
            sub_region: None,
            region: Some(raw.to_uppercase()),
        });
    }

    Err(SourceError::InvalidParameter {
        value: raw.to_string(),
    })
}
