//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline, including:
//! - Building the HTTP client with user agent, timeout and session headers
//! - Quick transport-level retries for timeouts, refused connections and 5xx
//! - Error classification into [`ScrapeError::Network`]
//!
//! Retry with long backoff and pacing live one level up, in the crawler.

use crate::config::FetcherConfig;
use crate::ScrapeError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, StatusCode};
use scraper::Html;
use std::time::Duration;

/// Pause between transport-level retries
const TRANSPORT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// A fetched HTML page
///
/// Keeps the raw body; call [`Document::parse`] to get a queryable tree.
/// The parsed tree is not `Send`, so callers parse in synchronous code and
/// never hold it across an await.
#[derive(Debug, Clone)]
pub struct Document {
    /// The url that was requested
    pub url: String,
    pub body: String,
}

impl Document {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Parses the body into a queryable HTML tree
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Source of HTML documents
///
/// Implementations own transport concerns (timeouts, quick retries) and
/// report any failure to produce a 2xx body as [`ScrapeError::Network`].
#[async_trait]
pub trait HtmlFetcher {
    /// Fetches `url`; `with_headers` attaches the session headers
    async fn fetch(&self, url: &str, with_headers: bool) -> Result<Document, ScrapeError>;
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
    session_headers: HeaderMap,
    transport_retries: u32,
}

impl HttpFetcher {
    /// Builds a fetcher from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Client built
    /// * `Err(ScrapeError)` - Invalid cookie header or client build failure
    pub fn new(config: &FetcherConfig) -> Result<Self, ScrapeError> {
        let mut session_headers = HeaderMap::new();
        if let Some(cookie) = &config.cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| {
                ScrapeError::Config(crate::ConfigError::Validation(format!(
                    "cookie is not a valid header value: {}",
                    e
                )))
            })?;
            session_headers.insert(COOKIE, value);
        }

        Ok(Self {
            client: build_http_client(config)?,
            session_headers,
            transport_retries: config.transport_retries,
        })
    }

    async fn fetch_once(&self, url: &str, with_headers: bool) -> Result<String, Attempt> {
        let mut request = self.client.get(url);
        if with_headers {
            request = request.headers(self.session_headers.clone());
        }

        let response = request.send().await.map_err(|e| classify(&e))?;
        let status = response.status();

        if !status.is_success() {
            let message = format!("HTTP {}", status.as_u16());
            return Err(if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                Attempt::Retry(message)
            } else {
                Attempt::Fail(message)
            });
        }

        response.text().await.map_err(|e| classify(&e))
    }
}

/// Outcome of one failed transport attempt
enum Attempt {
    /// Worth another quick try
    Retry(String),
    /// Will not get better by retrying right away
    Fail(String),
}

fn classify(e: &reqwest::Error) -> Attempt {
    if e.is_timeout() {
        Attempt::Retry("Request timeout".to_string())
    } else if e.is_connect() {
        Attempt::Retry("Connection refused".to_string())
    } else {
        Attempt::Fail(e.to_string())
    }
}

#[async_trait]
impl HtmlFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, with_headers: bool) -> Result<Document, ScrapeError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url, with_headers).await {
                Ok(body) => {
                    tracing::debug!(url, "Loaded");
                    return Ok(Document::new(url, body));
                }
                Err(Attempt::Retry(message)) if attempt < self.transport_retries => {
                    attempt += 1;
                    tracing::debug!(url, attempt, %message, "Transport retry");
                    tokio::time::sleep(TRANSPORT_RETRY_DELAY).await;
                }
                Err(Attempt::Retry(message)) | Err(Attempt::Fail(message)) => {
                    tracing::debug!(url, %message, "Cannot get HTML");
                    return Err(ScrapeError::Network {
                        url: url.to_string(),
                        message,
                    });
                }
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_millis(config.response_timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}
