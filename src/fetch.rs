use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use url::Url;

use crate::error::FetchError;

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw page markup.
///
/// Implementations report every failure as a [`FetchError`] value, never by
/// panicking, so one bad page cannot take down a whole run.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5,ar;q=0.3";

/// Headers of a desktop browser, sent with every page request.
pub fn browser_headers() -> HeaderMap {
    [
        (header::USER_AGENT, BROWSER_USER_AGENT),
        (header::ACCEPT, BROWSER_ACCEPT),
        (header::ACCEPT_LANGUAGE, BROWSER_ACCEPT_LANGUAGE),
    ]
    .into_iter()
    .map(|(name, value)| (name, HeaderValue::from_static(value)))
    .collect()
}

/// Fetches pages over HTTP, by default with [`browser_headers`].
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
    headers: HeaderMap,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Self::with_headers(timeout, browser_headers())
    }

    pub fn with_headers(timeout: Duration, headers: HeaderMap) -> reqwest::Result<Self> {
        let client = Client::builder()
            .default_headers(headers.clone())
            .timeout(timeout)
            .build()?;
        Ok(HttpFetcher { client, headers })
    }

    /// Headers attached to every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let request_failed = |source: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let webpage = self
            .client
            .get(url.to_owned())
            .send()
            .await
            .map_err(request_failed)?;
        let status = webpage.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        webpage.text().await.map_err(request_failed)
    }
}
