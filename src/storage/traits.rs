//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{Comment, Link, StoreStats, Submission, SubmissionFields};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every write is idempotent: links and favorites are insert-ignore,
/// comments are upserts, metadata is an update keyed by url. Batches are
/// written in a single transaction.
pub trait Store {
    // ===== Links =====

    /// Records bare submission links, ignoring urls already present
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted
    fn save_links(&mut self, links: &[String], is_scraps: bool, owner: &str)
        -> StorageResult<usize>;

    /// Gets all links that do not have metadata yet, newest url first
    fn get_submission_links(&self) -> StorageResult<Vec<Link>>;

    /// Removes the row for a submission the site no longer has
    fn delete_submission(&mut self, url: &str) -> StorageResult<()>;

    // ===== Submissions =====

    /// Writes extracted metadata onto the row matching `url`
    ///
    /// # Returns
    ///
    /// The number of rows updated (0 when the url was never recorded)
    fn save_metadata(&mut self, url: &str, fields: &SubmissionFields) -> StorageResult<usize>;

    /// Gets the full row for a url
    fn get_submission(&self, url: &str) -> StorageResult<Option<Submission>>;

    /// Gets fetched rows that are missing required fields or still hold
    /// relative dates, optionally restricted to one uploader
    fn needs_repair(&self, owner: Option<&str>) -> StorageResult<Vec<Link>>;

    // ===== Comments =====

    /// Upserts a batch of comments; existing ids only get `desc` and `date` updated
    fn save_comments(&mut self, comments: &[Comment]) -> StorageResult<()>;

    /// Gets all comments of a submission
    fn get_comments(&self, submission_id: &str) -> StorageResult<Vec<Comment>>;

    // ===== Favorites =====

    /// Records favorites of `owner`, ignoring pairs already present
    fn save_favorites(&mut self, owner: &str, links: &[String]) -> StorageResult<usize>;

    /// Gets the favorited urls of a user
    fn get_favorites(&self, owner: &str) -> StorageResult<Vec<String>>;

    // ===== Statistics =====

    /// Gets row counts for progress reporting
    fn stats(&self) -> StorageResult<StoreStats>;
}
