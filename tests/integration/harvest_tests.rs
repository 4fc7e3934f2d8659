//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to stand in for the art site and run the real
//! HTTP fetcher against an on-disk database.

use gallery_harvest::config::{load_config, Config};
use gallery_harvest::crawler::{
    CancellationToken, CommentSource, Crawler, HttpFetcher, ListingKind, ScrapeOptions,
    WalkOutcome,
};
use gallery_harvest::storage::{open_storage, SqliteStorage, Store};
use gallery_harvest::ScrapeError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a config pointing at `base_url` with millisecond waits
fn create_test_config(dir: &TempDir, base_url: &str, cookie: Option<&str>) -> Config {
    let cookie = cookie
        .map(|c| format!("cookie = \"{}\"\n", c))
        .unwrap_or_default();
    let toml = format!(
        r#"
[site]
base-url = "{base_url}"

[fetcher]
user-agent = "gallery-harvest-test/1.0"
{cookie}response-timeout-ms = 2000
transport-retries = 0

[retry]
backoff-base-ms = 1

[pacing]
min-delay-ms = 0
max-delay-ms = 1
recovered-min-delay-ms = 0
recovered-max-delay-ms = 1

[storage]
database-path = "{db}"
"#,
        db = dir.path().join("harvest.db").display()
    );

    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, toml).expect("Failed to write config");
    load_config(&config_path).expect("Failed to load config")
}

fn create_crawler(config: &Config) -> Crawler<HttpFetcher, SqliteStorage> {
    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");
    let store = open_storage(Path::new(&config.storage.database_path)).expect("Failed to open store");
    Crawler::from_config(config, fetcher, store, CancellationToken::new())
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn gallery_page(ids: &[u32]) -> String {
    let figures: String = ids
        .iter()
        .map(|id| format!(r#"<figure><figcaption><p><a href="/view/{id}/">#{id}</a></p></figcaption></figure>"#))
        .collect();
    format!("<html><body><section class=\"gallery\">{figures}</section></body></html>")
}

fn submission_page(title: &str, comments: &str) -> String {
    format!(
        r#"<html><body>
        <div class="section-header">
            <div class="submission-title"><h2><p>{title}</p></h2></div>
            <span class="c-usernameBlockSimple__displayName" title="the_artist">The Artist</span>
        </div>
        <div class="submission-id-sub-container">
            <span class="popup_date" title="Jun 6, 2022 06:06 PM">2 years ago</span>
        </div>
        <div class="download"><a href="//d.example/art/the_artist/full.png">Download</a></div>
        <section class="tags-row"><span class="tags"><a>ink</a></span></section>
        <div class="rating"><span class="rating-box">General</span></div>
        <section class="info text"><div><div>Artwork (Traditional)</div></div></section>
        <section id="comments-submission">{comments}</section>
        </body></html>"#
    )
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_scrape_single_user() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&dir, &server.uri(), None);

    mount(&server, "/gallery/artist/1", html(gallery_page(&[2, 1]))).await;
    mount(&server, "/gallery/artist/2", html(gallery_page(&[]))).await;
    mount(&server, "/view/2/", html(submission_page("Second", ""))).await;
    mount(&server, "/view/1/", html(submission_page("First", ""))).await;

    let mut crawler = create_crawler(&config);
    let summary = crawler
        .scrape(&config.site.base_url, "artist", ScrapeOptions::default())
        .await
        .expect("Scrape failed");

    assert_eq!(summary.walks.len(), 1);
    assert_eq!(summary.walks[0].1.discovered, 2);
    assert_eq!(summary.metadata.as_ref().map(|m| m.saved), Some(2));

    let url = format!("{}/view/1/", server.uri());
    let row = crawler.store().get_submission(&url).unwrap().unwrap();
    assert_eq!(row.id.as_deref(), Some("1"));
    assert_eq!(row.title.as_deref(), Some("First"));
    assert_eq!(row.username.as_deref(), Some("the_artist"));
    assert_eq!(row.account_name.as_deref(), Some("theartist"));
    assert_eq!(row.content_url.as_deref(), Some("https://d.example/art/the_artist/full.png"));
    assert_eq!(row.content_name.as_deref(), Some("full.png"));
    assert_eq!(row.tags.as_deref(), Some("ink"));
    assert_eq!(row.date_uploaded.as_deref(), Some("Jun 6, 2022 06:06 PM"));
    assert!(row.is_complete());

    let stats = crawler.store().stats().unwrap();
    assert_eq!(stats.links, 2);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.complete, 2);
}

#[tokio::test]
async fn test_listing_abort_after_attempt_ceiling() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&dir, &server.uri(), None);

    Mock::given(method("GET"))
        .and(path("/gallery/artist/1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(6)
        .mount(&server)
        .await;

    let mut crawler = create_crawler(&config);
    let summary = crawler
        .walk_listing(&config.site.base_url, "artist", ListingKind::Gallery)
        .await
        .expect("Walk failed");

    assert_eq!(summary.outcome, WalkOutcome::Aborted);
    assert!(crawler.cancel_token().is_cancelled());
    assert_eq!(crawler.store().stats().unwrap().links, 0);
}

#[tokio::test]
async fn test_failing_item_skipped_after_three_attempts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&dir, &server.uri(), None);

    mount(&server, "/gallery/artist/1", html(gallery_page(&[9, 8]))).await;
    mount(&server, "/gallery/artist/2", html(gallery_page(&[]))).await;
    Mock::given(method("GET"))
        .and(path("/view/9/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    mount(&server, "/view/8/", html(submission_page("Eight", ""))).await;

    let mut crawler = create_crawler(&config);
    let summary = crawler
        .scrape(&config.site.base_url, "artist", ScrapeOptions::default())
        .await
        .expect("Scrape failed");

    let metadata = summary.metadata.expect("Metadata pass did not run");
    assert_eq!(metadata.skipped, 1);
    assert_eq!(metadata.saved, 1);

    let pending = crawler.store().get_submission_links().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].url, format!("{}/view/9/", server.uri()));
}

#[tokio::test]
async fn test_session_cookie_sent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&dir, &server.uri(), Some("a=1; b=2"));

    Mock::given(method("GET"))
        .and(path("/view/5/"))
        .and(header("cookie", "a=1; b=2"))
        .respond_with(html(submission_page(
            "Five",
            r#"<div class="comment_container" style="width:100%">
                <a class="comment_anchor" id="cid:50"></a>
                <comment-container class="comment-container">
                    <comment-username>visitor</comment-username>
                    <comment-date><span class="popup_date" title="Jul 7, 2022 07:07 AM">2 years ago</span></comment-date>
                    <comment-user-text><div class="user-submitted-links">Great</div></comment-user-text>
                </comment-container>
            </div>"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut crawler = create_crawler(&config);
    let url = format!("{}/view/5/", server.uri());
    let saved = crawler
        .fetch_comments(CommentSource::Url(&url), "5")
        .await
        .expect("Comment fetch failed");

    assert!(saved);
    let comments = crawler.store().get_comments("5").unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].username, "visitor");
    assert_eq!(comments[0].date, "Jul 7, 2022 07:07 AM");
}

#[tokio::test]
async fn test_resume_after_restart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&dir, &server.uri(), None);

    mount(&server, "/gallery/artist/1", html(gallery_page(&[3, 2, 1]))).await;
    mount(&server, "/gallery/artist/2", html(gallery_page(&[]))).await;

    {
        let mut crawler = create_crawler(&config);
        crawler
            .walk_listing(&config.site.base_url, "artist", ListingKind::Gallery)
            .await
            .expect("Walk failed");
    }

    mount(&server, "/view/3/", html(submission_page("Three", ""))).await;
    mount(&server, "/view/2/", html(submission_page("Two", ""))).await;
    mount(&server, "/view/1/", html(submission_page("One", ""))).await;

    let mut crawler = create_crawler(&config);
    // Walking again must not duplicate rows
    crawler
        .walk_listing(&config.site.base_url, "artist", ListingKind::Gallery)
        .await
        .expect("Walk failed");
    assert_eq!(crawler.store().stats().unwrap().links, 3);

    let summary = crawler.fetch_all(None, false).await.expect("Metadata failed");
    assert_eq!(summary.total, 3);
    assert_eq!(summary.saved, 3);
    assert!(crawler.store().get_submission_links().unwrap().is_empty());
}

#[tokio::test]
async fn test_store_open_failure_is_fatal() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let missing = dir.path().join("no-such-dir").join("harvest.db");

    assert!(matches!(
        open_storage(&missing),
        Err(ScrapeError::FatalInit(_))
    ));
}
