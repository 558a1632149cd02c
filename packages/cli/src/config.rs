//! Runtime configuration.
//!
//! Built-in defaults, overridden by environment variables, overridden by
//! command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use covid_widget_source::params::RegionDefaults;
use covid_widget_source::registry::DEFAULT_PROVIDER_ID;

/// Per-request timeout when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Environment variable selecting the provider id.
pub const ENV_PROVIDER: &str = "COVID_WIDGET_PROVIDER";
/// Environment variable overriding the default health region.
pub const ENV_SUB_REGION: &str = "COVID_WIDGET_SUB_REGION";
/// Environment variable overriding the default province/territory.
pub const ENV_REGION: &str = "COVID_WIDGET_REGION";
/// Environment variable overriding the cache file path.
pub const ENV_CACHE_PATH: &str = "COVID_WIDGET_CACHE_PATH";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "COVID_WIDGET_TIMEOUT_SECS";

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Provider id to look up in the registry.
    pub provider_id: String,
    /// Areas used when no parameter is given.
    pub defaults: RegionDefaults,
    /// Cache slot location.
    pub cache_path: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            provider_id: DEFAULT_PROVIDER_ID.to_string(),
            defaults: RegionDefaults::default(),
            cache_path: covid_widget_cache::paths::default_cache_path(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Flag values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--provider`
    pub provider_id: Option<String>,
    /// `--cache-path`
    pub cache_path: Option<PathBuf>,
    /// `--timeout-secs`
    pub timeout_secs: Option<u64>,
}

impl WidgetConfig {
    /// Builds the configuration from the process environment.
    #[must_use]
    pub fn from_env(overrides: ConfigOverrides) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F, overrides: ConfigOverrides) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = non_empty(ENV_PROVIDER) {
            config.provider_id = provider;
        }
        let sub_region = non_empty(ENV_SUB_REGION);
        if let Some(region) = non_empty(ENV_REGION) {
            config.defaults.region = region.to_uppercase();
            // A province on its own means a province-only default.
            if sub_region.is_none() {
                config.defaults.sub_region = None;
            }
        }
        if sub_region.is_some() {
            config.defaults.sub_region = sub_region;
        }
        if let Some(path) = non_empty(ENV_CACHE_PATH) {
            config.cache_path = PathBuf::from(path);
        }
        if let Some(raw) = non_empty(ENV_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => log::warn!(
                    "Ignoring {ENV_TIMEOUT_SECS}={raw:?}, using {}s",
                    config.timeout.as_secs()
                ),
            }
        }

        if let Some(provider) = overrides.provider_id {
            config.provider_id = provider;
        }
        if let Some(path) = overrides.cache_path {
            config.cache_path = path;
        }
        if let Some(secs) = overrides.timeout_secs.filter(|s| *s > 0) {
            config.timeout = Duration::from_secs(secs);
        }

        config
    }
}
