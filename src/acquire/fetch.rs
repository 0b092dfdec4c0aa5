// src/acquire/fetch.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of raw page HTML. Swapped for a static fixture in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
    fn name(&self) -> &'static str;
}

/// Plain GET with a browser-like user agent and a bounded timeout. No retries.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed =
            reqwest::Url::parse(url.trim()).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let resp = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "page fetch returned non-success status");
            return Err(FetchError::Status(status.as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unparsable_url_fails_before_any_request() {
        let fetcher = HttpFetcher::new().expect("client");
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
