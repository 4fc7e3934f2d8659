//! In-process fakes for pipeline tests

use crate::crawler::backoff::{Pacing, RetryPolicy};
use crate::crawler::cancel::CancellationToken;
use crate::crawler::coordinator::Crawler;
use crate::crawler::fetcher::{Document, HtmlFetcher};
use crate::storage::Store;
use crate::ScrapeError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Fetcher answering from per-url scripts
///
/// Each url holds a queue of responses; the last one repeats forever.
/// Unscripted urls always fail.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Option<String>>>>,
    log: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, body: String) -> Self {
        self.push(url, Some(body));
        self
    }

    pub fn failures(self, url: &str, count: usize) -> Self {
        for _ in 0..count {
            self.push(url, None);
        }
        self
    }

    fn push(&self, url: &str, response: Option<String>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn requested(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl HtmlFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _with_headers: bool) -> Result<Document, ScrapeError> {
        self.log.lock().unwrap().push(url.to_string());

        let response = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front().flatten(),
                Some(queue) => queue.front().cloned().flatten(),
                None => None,
            }
        };

        response
            .map(|body| Document::new(url, body))
            .ok_or_else(|| ScrapeError::Network {
                url: url.to_string(),
                message: "HTTP 503 Service Unavailable".to_string(),
            })
    }
}

/// Crawler with millisecond backoff, no pacing and default ceilings
pub fn test_crawler<S: Store>(fetcher: ScriptedFetcher, store: S) -> Crawler<ScriptedFetcher, S> {
    Crawler::new(
        fetcher,
        store,
        RetryPolicy::new(6, Duration::from_millis(1)),
        RetryPolicy::new(3, Duration::from_millis(1)),
        Pacing::new(Duration::ZERO, Duration::ZERO, Duration::ZERO, Duration::ZERO),
        CancellationToken::new(),
    )
}

/// Normal pause of exactly this long
pub const PACE: Duration = Duration::from_millis(100);
/// Widened pause of exactly this long
pub const RECOVERED_PACE: Duration = Duration::from_millis(1000);

/// Like [`test_crawler`], with fixed, distinguishable pauses
///
/// Meant for `start_paused` tests that read pacing off the virtual clock.
pub fn paced_crawler<S: Store>(fetcher: ScriptedFetcher, store: S) -> Crawler<ScriptedFetcher, S> {
    Crawler::new(
        fetcher,
        store,
        RetryPolicy::new(6, Duration::from_millis(1)),
        RetryPolicy::new(3, Duration::from_millis(1)),
        Pacing::new(PACE, PACE, RECOVERED_PACE, RECOVERED_PACE),
        CancellationToken::new(),
    )
}

/// A listing page holding `/view/{id}/` links and an optional next control
pub fn gallery_page(ids: &[u32], next: Option<&str>) -> String {
    let figures: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<figure id="sid-{id}"><figcaption><p><a href="/view/{id}/">Title {id}</a></p></figcaption></figure>"#
            )
        })
        .collect();
    let next = next
        .map(|action| format!(r#"<form action="{action}" method="get"><button>Next</button></form>"#))
        .unwrap_or_default();
    format!(r#"<html><body><section class="gallery">{figures}</section>{next}</body></html>"#)
}

/// A complete submission page; `comments` is inserted into the thread section
pub fn submission_page(id: &str, title: &str, comments: &str) -> String {
    format!(
        r#"<html><body>
        <div class="section-header">
            <div class="submission-title"><h2><p>{title}</p></h2></div>
            <span class="c-usernameBlockSimple__displayName" title="artist">Artist</span>
        </div>
        <div class="submission-id-sub-container">
            <span class="popup_date" title="Jan 1, 2020 12:00 PM">5 years ago</span>
        </div>
        <div class="download"><a href="//d.example/art/artist/{id}.png">Download</a></div>
        <div class="submission-description">About {title}</div>
        <div class="rating"><span class="rating-box">General</span></div>
        <section class="info text"><div><div>Artwork</div></div></section>
        <section id="comments-submission">{comments}</section>
        </body></html>"#
    )
}

/// The site's page for a removed submission
pub fn gone_page() -> String {
    format!(
        r#"<html><body><div class="section-body"><p>{}</p></div></body></html>"#,
        crate::extract::CONTENT_GONE_MESSAGE
    )
}
