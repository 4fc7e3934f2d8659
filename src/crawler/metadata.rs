//! Per-submission metadata
//!
//! Pulls unresolved links from the store and resolves each one to either a
//! complete row, a deletion, or a skip. The store never holds a half-written
//! submission: fields land in one update keyed by url.

use crate::crawler::comments::CommentSource;
use crate::crawler::coordinator::{Crawler, Fetched};
use crate::crawler::fetcher::{Document, HtmlFetcher};
use crate::extract::{parse_submission, SubmissionPage};
use crate::storage::{Link, Store};
use crate::ScrapeError;

/// Totals of one metadata pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchAllSummary {
    pub total: usize,
    pub saved: usize,
    pub deleted: usize,
    pub skipped: usize,
    /// True if the pass stopped before reaching the last link
    pub cancelled: bool,
}

/// What happened to a single link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    Saved,
    Deleted,
    Skipped,
}

impl<F: HtmlFetcher, S: Store> Crawler<F, S> {
    /// Fetches metadata for `links`, or for every unresolved link in the store
    ///
    /// Links are processed strictly in order. Items that keep failing are
    /// skipped; a storage failure ends the pass with an error.
    pub async fn fetch_all(
        &mut self,
        links: Option<Vec<Link>>,
        with_comments: bool,
    ) -> Result<FetchAllSummary, ScrapeError> {
        let links = match links {
            Some(links) => links,
            None => self.store.get_submission_links()?,
        };

        let mut summary = FetchAllSummary {
            total: links.len(),
            ..FetchAllSummary::default()
        };
        tracing::info!(total = summary.total, "Fetching submission metadata");

        for (index, link) in links.iter().enumerate() {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let processed = index + 1;
            let fetched = self.fetch_with_retry(&link.url, &self.item_retry).await;
            let (outcome, recovered) = match fetched {
                Fetched::Document { doc, failures } => {
                    let outcome = self.process_submission(&link.url, &doc, with_comments).await?;
                    (outcome, failures > 0)
                }
                Fetched::Exhausted { attempts, error } => {
                    tracing::warn!(url = %link.url, attempts, %error, "Skipping submission");
                    summary.skipped += 1;
                    tracing::info!(progress = processed, total = summary.total, "Processed");
                    if !self.pause(true).await {
                        summary.cancelled = processed < summary.total;
                        break;
                    }
                    continue;
                }
                Fetched::Cancelled => {
                    summary.cancelled = true;
                    break;
                }
            };

            match outcome {
                ItemOutcome::Saved => summary.saved += 1,
                ItemOutcome::Deleted => summary.deleted += 1,
                ItemOutcome::Skipped => summary.skipped += 1,
            }
            tracing::info!(progress = processed, total = summary.total, "Processed");

            if processed % 2 == 1 && processed < summary.total && !self.pause(recovered).await {
                summary.cancelled = true;
                break;
            }
        }

        tracing::info!(
            saved = summary.saved,
            deleted = summary.deleted,
            skipped = summary.skipped,
            "Metadata pass finished"
        );
        Ok(summary)
    }

    /// Fetches metadata for stored rows that are incomplete, optionally for
    /// one uploader only
    pub async fn repair(
        &mut self,
        owner: Option<&str>,
        with_comments: bool,
    ) -> Result<FetchAllSummary, ScrapeError> {
        let links = self.store.needs_repair(owner)?;
        tracing::info!(count = links.len(), "Repairing incomplete submissions");
        self.fetch_all(Some(links), with_comments).await
    }

    async fn process_submission(
        &mut self,
        url: &str,
        doc: &Document,
        with_comments: bool,
    ) -> Result<ItemOutcome, ScrapeError> {
        let page = parse_submission(doc).and_then(|page| match page {
            SubmissionPage::Present(fields) => Ok(fields),
            SubmissionPage::Gone => Err(ScrapeError::ContentGone {
                url: url.to_string(),
            }),
        });

        let fields = match page {
            Ok(fields) => fields,
            Err(error @ ScrapeError::ContentGone { .. }) => {
                tracing::warn!(url, %error, "Submission no longer exists, removing it");
                self.store.delete_submission(url)?;
                return Ok(ItemOutcome::Deleted);
            }
            Err(error) => {
                tracing::warn!(url, %error, "Skipping unrecognised page");
                return Ok(ItemOutcome::Skipped);
            }
        };

        if self.store.save_metadata(url, &fields)? == 0 {
            tracing::debug!(url, "No stored row for url");
        }
        tracing::debug!(url, id = %fields.id, title = %fields.title, "Saved metadata");

        if with_comments {
            self.fetch_comments(CommentSource::Document(doc), &fields.id)
                .await?;
        }
        Ok(ItemOutcome::Saved)
    }
}
