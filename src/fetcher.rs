use crate::types::{AlertsError, FetchConfig, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Single-shot HTTP document fetcher. One fetch per feed per run, no retry,
/// no conditional-request caching.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let redirect_policy = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect_policy)
            .build()?;

        Ok(Self { client })
    }

    /// GET the document at `url` and return its body text. Any non-success
    /// status is an error.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        Url::parse(url)?;
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AlertsError::FeedFetch {
                url: url.to_string(),
                reason: format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}
