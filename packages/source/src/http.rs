//! `reqwest`-backed [`JsonClient`].
//!
//! Every request is a single attempt bounded by the client timeout. A
//! failed request is reported immediately so the caller can fall back to
//! the cache instead of waiting on retries.
//!
//! ```ignore
//! let client = HttpClient::new(Duration::from_secs(10))?;
//! let body = client.get_json("https://api.opencovid.ca/summary?loc=MB").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;

use crate::{JsonClient, SourceError};

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Single-attempt JSON-over-HTTP client with a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Builds a client whose requests fail after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Network`] if the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonClient for HttpClient {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, SourceError> {
        log::debug!("GET {url}");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    log::warn!("Request timed out: {url}");
                } else {
                    log::warn!("Request failed: {url}: {e}");
                }
                return Err(SourceError::Network(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::warn!("HTTP {status} from {url}");
            return Err(SourceError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        // Read the raw body as text first so the content can be logged on
        // a parse failure.
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|json_err| {
            log::warn!(
                "JSON parse failed.\n  \
                 url: {url}\n  \
                 status: {status}\n  \
                 content-type: {content_type:?}\n  \
                 received: {} bytes\n  \
                 parse error: {json_err}\n  \
                 body preview: {}",
                text.len(),
                preview(&text),
            );
            SourceError::Schema {
                message: format!(
                    "JSON parse failed: {json_err} (received {} bytes, content-type={content_type:?})",
                    text.len()
                ),
            }
        })
    }
}

/// Truncates `text` to [`BODY_PREVIEW_LEN`] bytes on a char boundary.
fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
