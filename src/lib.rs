//! Gallery-Harvest: an incremental, polite gallery archiver
//!
//! This crate walks the paginated gallery, scraps and favorites listings of a
//! user on an art site, records every submission link it finds, and then
//! fills in per-submission metadata and comment threads. All state lives in
//! SQLite and every write is idempotent, so an interrupted run simply resumes.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod storage;

use thiserror::Error;

/// Main error type for Gallery-Harvest operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Timeout, connection failure or non-2xx response. Retried by callers.
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// The site states that the submission no longer exists.
    #[error("Content gone: {url}")]
    ContentGone { url: String },

    /// The document did not have the expected shape.
    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    /// The store could not be opened or bootstrapped.
    #[error("Fatal initialization error: {0}")]
    FatalInit(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScrapeError {
    /// Returns true for failures worth retrying with backoff
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Http(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Gallery-Harvest operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, Document, HtmlFetcher, HttpFetcher};
pub use storage::{SqliteStorage, Store};
