//! Listing pagination
//!
//! Walks a gallery, scraps or favorites listing page by page, saving every
//! batch of submission links as it goes. Numbered listings stop at the first
//! empty page; favorites follow the page's "next" control until it is gone.

use crate::crawler::coordinator::{Crawler, Fetched};
use crate::crawler::fetcher::HtmlFetcher;
use crate::extract::parse_listing;
use crate::storage::{StorageResult, Store};
use crate::ScrapeError;

/// The listings a user has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    Gallery,
    Scraps,
    Favorites,
}

impl ListingKind {
    /// Base url of the listing; the walker appends page numbers to it
    pub fn base_url(&self, site_base: &str, user: &str) -> String {
        let site = site_base.trim_end_matches('/');
        let path = match self {
            Self::Gallery => "gallery",
            Self::Scraps => "scraps",
            Self::Favorites => "favorites",
        };
        format!("{}/{}/{}/", site, path, user)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::Scraps => "scraps",
            Self::Favorites => "favorites",
        }
    }
}

/// Why a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Reached a page with no links, or no further favorites page
    Exhausted,
    /// The token was cancelled from outside
    Cancelled,
    /// A listing page kept failing; the token has been cancelled
    Aborted,
}

/// Totals of one walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSummary {
    /// Links found across all pages, including ones already stored
    pub discovered: usize,
    /// Listing pages fetched successfully
    pub pages_fetched: u32,
    pub outcome: WalkOutcome,
}

impl<F: HtmlFetcher, S: Store> Crawler<F, S> {
    /// Walks one listing of `user`
    pub async fn walk_listing(
        &mut self,
        site_base: &str,
        user: &str,
        kind: ListingKind,
    ) -> Result<WalkSummary, ScrapeError> {
        let base_url = kind.base_url(site_base, user);
        self.walk(
            &base_url,
            user,
            kind == ListingKind::Scraps,
            kind == ListingKind::Favorites,
        )
        .await
    }

    /// Walks a listing starting at `base_url` + "1"
    ///
    /// # Returns
    ///
    /// * `Ok(WalkSummary)` - The walk ended normally, was cancelled, or aborted
    ///   after the listing retry budget ran out
    /// * `Err(ScrapeError::Storage)` - A batch could not be saved; the walk stops
    pub async fn walk(
        &mut self,
        base_url: &str,
        owner: &str,
        is_scraps: bool,
        is_favorites: bool,
    ) -> Result<WalkSummary, ScrapeError> {
        let mut page = 1u32;
        let mut next_url: Option<String> = None;
        let mut discovered = 0;
        let mut pages_fetched = 0;

        tracing::info!(base_url, owner, "Searching listing for submission links");

        let outcome = loop {
            if self.cancel.is_cancelled() {
                tracing::info!(base_url, "Stopped early");
                break WalkOutcome::Cancelled;
            }

            let page_url = next_url
                .take()
                .unwrap_or_else(|| format!("{}{}", base_url, page));

            let (doc, recovered) = match self.fetch_with_retry(&page_url, &self.listing_retry).await {
                Fetched::Document { doc, failures } => (doc, failures > 0),
                Fetched::Exhausted { attempts, error } => {
                    tracing::error!(
                        url = %page_url,
                        attempts,
                        %error,
                        "Site might be down, please try again later"
                    );
                    self.cancel.cancel();
                    break WalkOutcome::Aborted;
                }
                Fetched::Cancelled => break WalkOutcome::Cancelled,
            };
            pages_fetched += 1;

            let listing = parse_listing(&doc);
            if listing.links.is_empty() {
                break WalkOutcome::Exhausted;
            }

            if let Err(error) = self.save_page(&listing.links, owner, is_scraps, is_favorites) {
                tracing::error!(url = %page_url, page, %error, "Cannot save listing page, stopping walk");
                return Err(error.into());
            }
            discovered += listing.links.len();
            tracing::debug!(page, found = listing.links.len(), discovered, "Saved links");

            if is_favorites {
                match listing.next_page {
                    Some(next) => next_url = Some(next),
                    None => break WalkOutcome::Exhausted,
                }
            }
            page += 1;

            if !self.pause(recovered).await {
                break WalkOutcome::Cancelled;
            }
        };

        if outcome == WalkOutcome::Exhausted {
            tracing::info!(base_url, pages = pages_fetched, "{} submissions found", discovered);
        }

        Ok(WalkSummary {
            discovered,
            pages_fetched,
            outcome,
        })
    }

    fn save_page(
        &mut self,
        links: &[String],
        owner: &str,
        is_scraps: bool,
        is_favorites: bool,
    ) -> StorageResult<()> {
        self.store.save_links(links, is_scraps, owner)?;
        if is_favorites {
            self.store.save_favorites(owner, links)?;
        }
        Ok(())
    }
}
