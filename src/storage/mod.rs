//! Storage module for persisting archive data
//!
//! This module handles all database operations, including:
//! - SQLite database initialization
//! - Insert-ignore link discovery and favorites
//! - Metadata updates keyed by submission url
//! - Comment upserts
//! - The completeness query that drives repair passes

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{StorageError, StorageResult, Store};

use crate::ScrapeError;
use std::path::Path;

/// Opens the storage database, creating its tables if needed
///
/// Any failure here is fatal for the process and reported as
/// [`ScrapeError::FatalInit`].
pub fn open_storage(path: &Path) -> Result<SqliteStorage, ScrapeError> {
    SqliteStorage::new(path).map_err(|e| {
        ScrapeError::FatalInit(format!("cannot open {}: {}", path.display(), e))
    })
}

/// A submission link, with or without metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// The user whose listing the link was discovered on
    pub owner_username: Option<String>,
    pub is_scraps: bool,
    /// True once the row carries a submission id
    pub fetched: bool,
}

/// Fields extracted from a submission page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFields {
    pub id: String,
    pub title: String,
    pub desc: Option<String>,
    pub tags: Option<String>,
    pub username: Option<String>,
    pub account_name: Option<String>,
    pub pretty_username: Option<String>,
    pub content_url: Option<String>,
    pub content_name: Option<String>,
    pub thumbnail_url: Option<String>,
    pub date_uploaded: Option<String>,
    pub rating: Option<String>,
    pub category: Option<String>,
}

/// A full submission row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: Option<String>,
    pub url: String,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub tags: Option<String>,
    pub is_scraps: bool,
    pub date_uploaded: Option<String>,
    pub content_url: Option<String>,
    pub content_name: Option<String>,
    pub is_content_saved: bool,
    pub content_missing: bool,
    pub moved_content: bool,
    pub username: Option<String>,
    pub account_name: Option<String>,
    pub pretty_username: Option<String>,
    pub thumbnail_url: Option<String>,
    pub thumbnail_name: Option<String>,
    pub is_thumbnail_saved: bool,
    pub thumbnail_missing: bool,
    pub rating: Option<String>,
    pub category: Option<String>,
    pub owner_username: Option<String>,
    pub discovered_at: String,
}

impl Submission {
    /// A row is complete once every required field is set and no date is
    /// still relative. Comment dates are checked by [`Store::needs_repair`].
    pub fn is_complete(&self) -> bool {
        self.id.is_some()
            && self.username.is_some()
            && self.rating.is_some()
            && self.category.is_some()
            && !self.date_uploaded.as_deref().is_some_and(is_relative_date)
    }
}

/// A single comment of a submission thread
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub submission_id: String,
    pub width: Option<String>,
    pub username: String,
    pub account_name: String,
    pub desc: String,
    pub subtitle: String,
    pub date: String,
}

/// Row counts across the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub links: u64,
    pub pending: u64,
    pub complete: u64,
    pub needs_repair: u64,
    pub comments: u64,
    pub favorites: u64,
}

/// Returns true for dates the site rendered relative to now ("3 days ago")
pub fn is_relative_date(date: &str) -> bool {
    date.to_ascii_lowercase().contains("ago")
}

/// Derives the separator-free account name used for fuzzy user matching
pub fn account_name(username: &str) -> String {
    username.replace('_', "")
}
