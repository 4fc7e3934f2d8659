//! Crawler module for the harvest pipeline
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with transport-level retries
//! - Linear backoff, polite pacing and cooperative cancellation
//! - Listing pagination
//! - Per-submission metadata and comment threads

mod backoff;
mod cancel;
mod comments;
mod coordinator;
mod fetcher;
mod metadata;
mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use backoff::{Pacing, RetryPolicy};
pub use cancel::{cancel_on_ctrl_c, sleep_unless_cancelled, CancellationToken};
pub use comments::CommentSource;
pub use coordinator::{Crawler, Fetched, ScrapeOptions, ScrapeSummary};
pub use fetcher::{build_http_client, Document, HtmlFetcher, HttpFetcher};
pub use metadata::FetchAllSummary;
pub use walker::{ListingKind, WalkOutcome, WalkSummary};
