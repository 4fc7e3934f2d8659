use serde::Deserialize;

/// Main configuration structure for Gallery-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub storage: StorageConfig,
}

/// The site being archived
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin of the site, e.g. "https://www.furaffinity.net"
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Pre-acquired session cookie, sent when a fetch asks for headers
    #[serde(default)]
    pub cookie: Option<String>,

    /// Response timeout per request (milliseconds)
    #[serde(rename = "response-timeout-ms", default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Quick transport-level retries before a fetch reports failure
    #[serde(rename = "transport-retries", default = "default_transport_retries")]
    pub transport_retries: u32,
}

/// Retry ceilings and linear backoff unit
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Backoff unit; the n-th consecutive failure waits n times this (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Attempts for listing pages and comment pages
    #[serde(rename = "listing-max-attempts", default = "default_listing_max_attempts")]
    pub listing_max_attempts: u32,

    /// Attempts for a single submission page
    #[serde(rename = "item-max-attempts", default = "default_item_max_attempts")]
    pub item_max_attempts: u32,
}

/// Polite delay ranges between requests
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Lower bound used right after a failure
    #[serde(rename = "recovered-min-delay-ms", default = "default_recovered_min_delay_ms")]
    pub recovered_min_delay_ms: u64,

    /// Upper bound used right after a failure
    #[serde(rename = "recovered-max-delay-ms", default = "default_recovered_max_delay_ms")]
    pub recovered_max_delay_ms: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_response_timeout_ms() -> u64 {
    3000
}

fn default_transport_retries() -> u32 {
    5
}

fn default_backoff_base_ms() -> u64 {
    30_000
}

fn default_listing_max_attempts() -> u32 {
    6
}

fn default_item_max_attempts() -> u32 {
    3
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    2500
}

fn default_recovered_min_delay_ms() -> u64 {
    2000
}

fn default_recovered_max_delay_ms() -> u64 {
    3500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_base_ms: default_backoff_base_ms(),
            listing_max_attempts: default_listing_max_attempts(),
            item_max_attempts: default_item_max_attempts(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            recovered_min_delay_ms: default_recovered_min_delay_ms(),
            recovered_max_delay_ms: default_recovered_max_delay_ms(),
        }
    }
}
