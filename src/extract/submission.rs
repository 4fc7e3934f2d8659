//! Submission pages

use super::{absolutize, attr_of, find_first, non_empty, pick_date, select_first, text_of};
use crate::crawler::Document;
use crate::storage::{account_name, SubmissionFields};
use crate::ScrapeError;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// Text the site shows in place of a submission that was removed
pub const CONTENT_GONE_MESSAGE: &str =
    "The submission you are trying to find is not in our database.";

/// What a fetched submission page turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPage {
    Present(SubmissionFields),
    /// The site confirms the submission no longer exists
    Gone,
}

/// Extracts the submission id from a url such as `https://host/view/123/`
pub fn submission_id(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("view/")?;
    let id = rest.split('/').next()?.trim();
    non_empty(id.to_string())
}

/// Classifies and extracts a submission page
///
/// # Returns
///
/// * `Ok(SubmissionPage::Present)` - The page holds a submission
/// * `Ok(SubmissionPage::Gone)` - The site says it was removed
/// * `Err(ScrapeError::Parse)` - Neither shape was recognised
pub fn parse_submission(doc: &Document) -> Result<SubmissionPage, ScrapeError> {
    let html = doc.parse();

    let Some(title) = select_first(&html, ".submission-title") else {
        let body = select_first(&html, ".section-body")
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        if body.contains(CONTENT_GONE_MESSAGE) {
            return Ok(SubmissionPage::Gone);
        }
        return Err(ScrapeError::Parse {
            url: doc.url.clone(),
            message: "no submission title on page".to_string(),
        });
    };

    let id = submission_id(&doc.url).ok_or_else(|| ScrapeError::Parse {
        url: doc.url.clone(),
        message: "url has no submission id".to_string(),
    })?;

    let display_name = select_first(&html, ".section-header .c-usernameBlockSimple__displayName");
    let username = display_name
        .as_ref()
        .and_then(|el| attr_of(el, "title"))
        .and_then(non_empty);
    let pretty_username = display_name.as_ref().map(text_of).and_then(non_empty);

    let content_url = select_first(&html, ".download > a")
        .and_then(|a| attr_of(&a, "href"))
        .and_then(non_empty)
        .map(|href| absolutize(&href, &doc.url));
    let content_name = content_url
        .as_deref()
        .and_then(|url| url.rsplit('/').next())
        .map(str::to_string)
        .and_then(non_empty);

    Ok(SubmissionPage::Present(SubmissionFields {
        id,
        title: text_of(&title),
        desc: select_first(&html, ".submission-description")
            .map(|el| el.inner_html().trim().to_string()),
        tags: extract_tags(&html),
        account_name: username.as_deref().map(account_name),
        username,
        pretty_username,
        content_url,
        content_name,
        thumbnail_url: extract_thumbnail(&html).map(|src| absolutize(&src, &doc.url)),
        date_uploaded: select_first(&html, ".submission-id-sub-container .popup_date")
            .map(|el| pick_date(&el))
            .and_then(non_empty),
        rating: select_first(&html, ".rating .rating-box")
            .map(|el| text_of(&el))
            .and_then(non_empty),
        category: extract_category(&html),
    }))
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"(?i)\w*[a-z]\w*").expect("tag pattern is valid"))
}

/// Comma-joined words of the tag row
fn extract_tags(html: &Html) -> Option<String> {
    let row = select_first(html, ".tags-row")?;
    let text = row.text().collect::<String>();
    let tags: Vec<&str> = tag_pattern().find_iter(&text).map(|m| m.as_str()).collect();
    non_empty(tags.join(","))
}

/// Cover image of text and music submissions
fn extract_thumbnail(html: &Html) -> Option<String> {
    let container = select_first(html, ".page-content-type-text, .page-content-type-music")?;
    find_first(&container, "#submissionImg")
        .and_then(|img| attr_of(&img, "src"))
        .and_then(non_empty)
}

fn extract_category(html: &Html) -> Option<String> {
    let selector = Selector::parse(".info.text > div > div").ok()?;
    let category: String = html
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect();
    non_empty(category.trim().to_string())
}
