//! Comment threads on submission pages

use super::{attr_of, find_first, pick_date, text_of};
use crate::crawler::Document;
use crate::storage::{account_name, Comment};
use scraper::{ElementRef, Selector};

/// Extracts every comment of a submission page, in page order
///
/// Removed comments keep their id but carry no username, text or date.
/// Nodes without an anchor id cannot be keyed and are dropped.
pub fn parse_comments(doc: &Document, submission_id: &str) -> Vec<Comment> {
    let html = doc.parse();
    let Ok(selector) = Selector::parse("#comments-submission .comment_container") else {
        return Vec::new();
    };

    html.select(&selector)
        .filter_map(|node| parse_comment(&node, submission_id))
        .collect()
}

fn parse_comment(node: &ElementRef<'_>, submission_id: &str) -> Option<Comment> {
    let id = find_first(node, ".comment_anchor").and_then(|a| attr_of(&a, "id"))?;
    if id.is_empty() {
        return None;
    }

    let width = attr_of(node, "style");
    let is_deleted = find_first(node, "comment-container")
        .is_some_and(|c| c.value().classes().any(|class| class == "deleted-comment-container"));

    if is_deleted {
        return Some(Comment {
            id,
            submission_id: submission_id.to_string(),
            width,
            ..Comment::default()
        });
    }

    let username = find_first(node, "comment-username")
        .map(|el| text_of(&el))
        .unwrap_or_default();

    Some(Comment {
        id,
        submission_id: submission_id.to_string(),
        width,
        account_name: account_name(&username),
        username,
        desc: find_first(node, "comment-user-text .user-submitted-links")
            .map(|el| el.inner_html().trim().to_string())
            .unwrap_or_default(),
        subtitle: find_first(node, "comment-title")
            .map(|el| text_of(&el))
            .unwrap_or_default(),
        date: find_first(node, "comment-date > span")
            .map(|el| pick_date(&el))
            .unwrap_or_default(),
    })
}
