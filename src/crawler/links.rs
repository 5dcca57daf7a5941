//! Anchor link discovery for the frontier

use crate::url::resolve_link;
use scraper::{Html, Selector};
use url::Url;

/// Extracts every `<a href>` target from a page as an absolute HTTP(S) URL
///
/// Relative hrefs are resolved against `page_url`, the URL the page was
/// actually served from, not the crawl seed. Order follows the document and
/// duplicates are kept; the frontier deduplicates.
///
/// # Example
///
/// ```
/// use ripple_search::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/a">A</a><a href="mailto:x@y.z">mail</a>"#;
/// let base = Url::parse("https://example.com/dir/page").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/a");
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .collect()
}
