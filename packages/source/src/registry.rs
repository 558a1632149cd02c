//! Provider registry — loads all provider definitions from embedded TOML.
//!
//! Each `.toml` file in `packages/source/providers/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a provider means
//! adding a TOML file here; adding a schema means adding an adapter too.

use covid_widget_source_models::ProviderDefinition;

use crate::SourceError;

/// TOML configs embedded at compile time.
const PROVIDER_TOMLS: &[(&str, &str)] = &[
    (
        "covid19tracker",
        include_str!("../providers/covid19tracker.toml"),
    ),
    (
        "opencovid_legacy",
        include_str!("../providers/opencovid_legacy.toml"),
    ),
    ("opencovid", include_str!("../providers/opencovid.toml")),
];

/// Identifier of the provider used when none is configured.
pub const DEFAULT_PROVIDER_ID: &str = "covid19tracker";

/// Parses a provider definition from a TOML string.
///
/// # Errors
///
/// Returns an error string if the TOML is malformed or missing fields.
pub fn parse_provider_toml(toml_str: &str) -> Result<ProviderDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

/// Returns all configured provider definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_providers() -> Vec<ProviderDefinition> {
    PROVIDER_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_provider_toml(toml)
                .unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a provider by id.
///
/// # Errors
///
/// Returns [`SourceError::UnknownProvider`] if no provider has that id.
pub fn find_provider(id: &str) -> Result<ProviderDefinition, SourceError> {
    all_providers()
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| SourceError::UnknownProvider { id: id.to_string() })
}
