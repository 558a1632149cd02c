#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Case summary providers and normalization logic.
//!
//! Each provider schema has one adapter implementing
//! [`schema::SchemaAdapter`], which maps raw JSON into the uniform
//! [`covid_widget_summary_models::CaseSummary`]. [`fetch::fetch_summaries`]
//! drives the sequential per-level requests through a [`JsonClient`].

pub mod fetch;
pub mod http;
pub mod params;
pub mod parsing;
pub mod provinces;
pub mod registry;
pub mod schema;
pub mod trend;

use async_trait::async_trait;

/// Errors that can occur while fetching or normalizing provider data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The request could not be sent or timed out.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// The response body was not the JSON shape the adapter expects.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of what went wrong.
        message: String,
    },

    /// A last-updated marker could not be turned into a timestamp.
    #[error("Unrecognized timestamp: {value:?}")]
    TimestampParse {
        /// The raw marker.
        value: String,
    },

    /// Too few daily points to derive the trend.
    #[error("Need at least {required} daily points, got {available}")]
    InsufficientData {
        /// Minimum number of points.
        required: usize,
        /// Points actually present.
        available: usize,
    },

    /// The free-text region parameter has an unsupported shape.
    #[error("Invalid region parameter: {value:?}")]
    InvalidParameter {
        /// The rejected input.
        value: String,
    },

    /// No provider with the requested id is registered.
    #[error("Unknown provider: {id}")]
    UnknownProvider {
        /// The requested provider id.
        id: String,
    },
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Schema {
            message: e.to_string(),
        }
    }
}

/// Minimal HTTP seam: fetch a URL and parse the body as JSON.
///
/// [`http::HttpClient`] is the production implementation; tests substitute
/// canned responses.
#[async_trait]
pub trait JsonClient: Send + Sync {
    /// Issues a GET request and returns the parsed JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failure, timeout, non-2xx
    /// status, or a body that is not valid JSON.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, SourceError>;
}
