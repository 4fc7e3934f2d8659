//! Gallery, scraps and favorites listing pages

use super::{absolutize, select_first};
use crate::crawler::Document;
use scraper::Selector;

/// Links found on one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Absolute submission urls, in page order
    pub links: Vec<String>,
    /// Absolute url of the next favorites page, if the page has the control
    pub next_page: Option<String>,
}

/// Extracts submission links and the "next" control from a listing page
pub fn parse_listing(doc: &Document) -> ListingPage {
    let html = doc.parse();

    let links = match Selector::parse(r#"figcaption a[href^="/view"]"#) {
        Ok(selector) => html
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| absolutize(href, &doc.url))
            .collect(),
        Err(_) => Vec::new(),
    };

    let next_page = select_first(&html, r#"form[action$="next"]"#)
        .and_then(|form| form.value().attr("action"))
        .filter(|action| !action.trim().is_empty())
        .map(|action| absolutize(action, &doc.url));

    ListingPage { links, next_page }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_links_in_order() {
        let doc = Document::new(
            "https://www.furaffinity.net/gallery/artist/1",
            r#"<html><body><section class="gallery">
                <figure><figcaption><p><a href="/view/300/">Third</a></p>
                    <p><a href="/user/artist/">artist</a></p></figcaption></figure>
                <figure><figcaption><p><a href="/view/200/">Second</a></p></figcaption></figure>
                <figure><a href="/view/999/">thumbnail only</a></figure>
            </section></body></html>"#,
        );

        let page = parse_listing(&doc);
        assert_eq!(
            page.links,
            vec![
                "https://www.furaffinity.net/view/300/",
                "https://www.furaffinity.net/view/200/"
            ]
        );
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn test_empty_listing() {
        let doc = Document::new(
            "https://www.furaffinity.net/gallery/artist/9",
            "<html><body><section class=\"gallery\"></section></body></html>",
        );
        assert_eq!(parse_listing(&doc), ListingPage::default());
    }

    #[test]
    fn test_favorites_next_control() {
        let doc = Document::new(
            "https://www.furaffinity.net/favorites/fan/1",
            r#"<html><body>
                <figure><figcaption><a href="/view/5/">Fave</a></figcaption></figure>
                <form action="/favorites/fan/1234567/prev" method="get"><button>Prev</button></form>
                <form action="/favorites/fan/1234500/next" method="get"><button>Next</button></form>
            </body></html>"#,
        );

        let page = parse_listing(&doc);
        assert_eq!(page.links, vec!["https://www.furaffinity.net/view/5/"]);
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://www.furaffinity.net/favorites/fan/1234500/next")
        );
    }
}
