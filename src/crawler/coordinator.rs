//! Crawler context and top-level orchestration
//!
//! [`Crawler`] bundles everything the pipeline stages share: the fetcher, the
//! store, both retry policies, pacing and the cancellation token. The stages
//! themselves live in `walker`, `metadata` and `comments` as further `impl`
//! blocks on the same type.

use crate::config::Config;
use crate::crawler::backoff::{Pacing, RetryPolicy};
use crate::crawler::cancel::{sleep_unless_cancelled, CancellationToken};
use crate::crawler::fetcher::{Document, HtmlFetcher};
use crate::crawler::metadata::FetchAllSummary;
use crate::crawler::walker::{ListingKind, WalkOutcome, WalkSummary};
use crate::storage::Store;
use crate::ScrapeError;

/// Result of fetching one url under a retry policy
#[derive(Debug)]
pub enum Fetched {
    /// The document, and how many failures preceded it
    Document { doc: Document, failures: u32 },
    /// Every attempt failed
    Exhausted { attempts: u32, error: ScrapeError },
    /// The token fired before the next attempt
    Cancelled,
}

/// Shared pipeline context
pub struct Crawler<F, S> {
    pub(crate) fetcher: F,
    pub(crate) store: S,
    pub(crate) listing_retry: RetryPolicy,
    pub(crate) item_retry: RetryPolicy,
    pub(crate) pacing: Pacing,
    pub(crate) cancel: CancellationToken,
}

/// Which listings a full scrape covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub scraps: bool,
    pub favorites: bool,
    pub comments: bool,
}

/// Totals of a full scrape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub walks: Vec<(ListingKind, WalkSummary)>,
    pub metadata: Option<FetchAllSummary>,
}

impl<F: HtmlFetcher, S: Store> Crawler<F, S> {
    /// Creates a crawler from explicit policies
    pub fn new(
        fetcher: F,
        store: S,
        listing_retry: RetryPolicy,
        item_retry: RetryPolicy,
        pacing: Pacing,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            store,
            listing_retry,
            item_retry,
            pacing,
            cancel,
        }
    }

    /// Creates a crawler using the retry and pacing sections of `config`
    pub fn from_config(config: &Config, fetcher: F, store: S, cancel: CancellationToken) -> Self {
        Self::new(
            fetcher,
            store,
            RetryPolicy::listing(&config.retry),
            RetryPolicy::item(&config.retry),
            Pacing::from_config(&config.pacing),
            cancel,
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fetches `url`, retrying failures with linear backoff
    ///
    /// The token is checked before every attempt and every backoff sleep.
    pub(crate) async fn fetch_with_retry(&self, url: &str, policy: &RetryPolicy) -> Fetched {
        let mut failures = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Fetched::Cancelled;
            }

            match self.fetcher.fetch(url, true).await {
                Ok(doc) => return Fetched::Document { doc, failures },
                Err(error) => {
                    failures += 1;
                    if !policy.allows_retry(failures) {
                        tracing::warn!(url, attempts = failures, %error, "Giving up on url");
                        return Fetched::Exhausted {
                            attempts: failures,
                            error,
                        };
                    }

                    let wait = policy.delay_for(failures);
                    tracing::warn!(
                        url,
                        retry = failures,
                        %error,
                        "Site might be down, retrying in {} seconds",
                        wait.as_secs()
                    );
                    if !sleep_unless_cancelled(&self.cancel, wait).await {
                        return Fetched::Cancelled;
                    }
                }
            }
        }
    }

    /// Waits a polite random delay; false if cancelled meanwhile
    pub(crate) async fn pause(&self, recovered: bool) -> bool {
        sleep_unless_cancelled(&self.cancel, self.pacing.delay(recovered)).await
    }

    /// Walks a user's listings, then fetches metadata for everything pending
    ///
    /// Stops before the next stage once the token is cancelled, which a
    /// listing abort does.
    pub async fn scrape(
        &mut self,
        site_base: &str,
        user: &str,
        options: ScrapeOptions,
    ) -> Result<ScrapeSummary, ScrapeError> {
        let mut kinds = vec![ListingKind::Gallery];
        if options.scraps {
            kinds.push(ListingKind::Scraps);
        }
        if options.favorites {
            kinds.push(ListingKind::Favorites);
        }

        let mut summary = ScrapeSummary::default();
        for kind in kinds {
            if self.cancel.is_cancelled() {
                break;
            }
            let walk = self.walk_listing(site_base, user, kind).await?;
            let aborted = walk.outcome == WalkOutcome::Aborted;
            summary.walks.push((kind, walk));
            if aborted {
                return Ok(summary);
            }
        }

        if !self.cancel.is_cancelled() {
            summary.metadata = Some(self.fetch_all(None, options.comments).await?);
        }

        Ok(summary)
    }
}
