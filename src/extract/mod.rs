//! Site-specific HTML extraction
//!
//! Everything that knows about the site's markup lives here, so a layout
//! change only touches this module:
//! - `listing` finds submission links and the favorites "next" control
//! - `submission` turns a submission page into [`SubmissionFields`](crate::storage::SubmissionFields)
//! - `comments` turns a comment thread into [`Comment`](crate::storage::Comment) records
//!
//! All functions take a [`Document`](crate::crawler::Document) and return owned data.

mod comments;
mod listing;
mod submission;

pub use comments::parse_comments;
pub use listing::{parse_listing, ListingPage};
pub use submission::{parse_submission, submission_id, SubmissionPage, CONTENT_GONE_MESSAGE};

use crate::storage::is_relative_date;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Returns the first element matching `css`
fn select_first<'a>(html: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    html.select(&selector).next()
}

/// Returns the first descendant of `element` matching `css`
fn find_first<'a>(element: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    element.select(&selector).next()
}

/// Collects and trims the text content of an element
fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed attribute value
fn attr_of(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(|v| v.trim().to_string())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Picks the date to store from a date element
///
/// The site puts the absolute date in `title` and a relative one in the text,
/// swapping them for some accounts. Absolute wins when either is absolute.
fn pick_date(element: &ElementRef<'_>) -> String {
    let title = attr_of(element, "title").unwrap_or_default();
    let text = text_of(element);

    if !title.is_empty() && !is_relative_date(&title) {
        title
    } else if !text.is_empty() && !is_relative_date(&text) {
        text
    } else if !title.is_empty() {
        title
    } else {
        text
    }
}

/// Turns a protocol-relative or site-relative url into an absolute one
pub fn absolutize(raw: &str, base: &str) -> String {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("//") {
        return format!("https://{}", rest);
    }

    match Url::parse(base).and_then(|base| base.join(raw)) {
        Ok(url) => url.to_string(),
        Err(_) => raw.to_string(),
    }
}
