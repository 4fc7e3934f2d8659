//! Comment threads
//!
//! Comments are read either from a submission page the metadata pass already
//! holds, or fetched on demand by url.

use crate::crawler::coordinator::{Crawler, Fetched};
use crate::crawler::fetcher::{Document, HtmlFetcher};
use crate::extract::parse_comments;
use crate::storage::Store;
use crate::ScrapeError;

/// Where a comment thread comes from
#[derive(Debug, Clone, Copy)]
pub enum CommentSource<'a> {
    /// An already fetched submission page
    Document(&'a Document),
    /// A submission url to fetch first
    Url(&'a str),
}

impl<F: HtmlFetcher, S: Store> Crawler<F, S> {
    /// Extracts and upserts the comments of one submission
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - At least one comment was saved
    /// * `Ok(false)` - No comments, the page could not be fetched, or cancelled
    /// * `Err(ScrapeError::Storage)` - The batch could not be saved
    pub async fn fetch_comments(
        &mut self,
        source: CommentSource<'_>,
        submission_id: &str,
    ) -> Result<bool, ScrapeError> {
        if self.cancel.is_cancelled() {
            return Ok(false);
        }

        let fetched;
        let doc = match source {
            CommentSource::Document(doc) => doc,
            CommentSource::Url(url) => {
                match self.fetch_with_retry(url, &self.listing_retry).await {
                    Fetched::Document { doc, .. } => {
                        fetched = doc;
                        &fetched
                    }
                    Fetched::Exhausted { attempts, .. } => {
                        tracing::warn!(url, attempts, "Comment page not found");
                        return Ok(false);
                    }
                    Fetched::Cancelled => return Ok(false),
                }
            }
        };

        let comments = parse_comments(doc, submission_id);
        if comments.is_empty() {
            tracing::debug!(submission_id, "No comments");
            return Ok(false);
        }

        self.store.save_comments(&comments)?;
        tracing::debug!(submission_id, count = comments.len(), "Saved comments");
        Ok(true)
    }
}
