//! Content extractor
//!
//! Turns a fetched [`CrawledPage`] into a typed [`ExtractedDocument`]:
//! - Title, with `<h1>` and placeholder fallbacks
//! - Meta description
//! - Cleaned body text, preferring content containers over the whole `<body>`
//! - Headings in document order
//! - Outbound links with their anchor text
//!
//! `script`, `style`, `nav`, `header`, `footer` and `aside` subtrees never
//! contribute body text, headings or links.

mod text;

pub use text::clean_text;

use crate::crawler::CrawledPage;
use crate::url::resolve_link;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use thiserror::Error;
use text::{element_text, is_stripped};
use url::Url;

/// Title used when a page has neither `<title>` nor `<h1>`
pub const NO_TITLE: &str = "No Title";

/// Class fragments marking an element as a main content container
const CONTENT_CLASS_HINTS: &[&str] = &["content", "main", "article", "body"];

/// Errors raised while extracting a document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid page URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Invalid selector {0}")]
    Selector(String),
}

/// A heading with its numeric level (1 to 6)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// An `<a href>` found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundLink {
    /// Absolute URL, resolved against the page URL
    pub url: String,
    /// Cleaned anchor text
    pub text: String,
    /// The `title` attribute, or empty
    pub title: String,
}

/// Normalized document produced from one crawled page
///
/// `url` is the document identity; re-indexing the same URL replaces the
/// stored record.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub headings: Vec<Heading>,
    pub body_text: String,
    /// Character count of `body_text`
    pub body_length: usize,
    pub crawled_at: DateTime<Utc>,
    pub depth: u32,
    pub outbound_links: Vec<OutboundLink>,
}

impl ExtractedDocument {
    /// All heading texts joined with single spaces
    pub fn headings_text(&self) -> String {
        self.headings
            .iter()
            .map(|h| h.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Pre-compiled selectors for extraction
#[derive(Debug)]
pub struct Extractor {
    title: Selector,
    h1: Selector,
    meta_description: Selector,
    containers: Selector,
    body: Selector,
    headings: Selector,
    anchors: Selector,
}

impl Extractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            title: selector("title")?,
            h1: selector("h1")?,
            meta_description: selector(r#"meta[name="description"]"#)?,
            containers: selector("main, article, div")?,
            body: selector("body")?,
            headings: selector("h1, h2, h3, h4, h5, h6")?,
            anchors: selector("a[href]")?,
        })
    }

    /// Extracts a document from a crawled page
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidUrl` if the page URL cannot be parsed;
    /// outbound links could not be resolved without it.
    pub fn extract(&self, page: &CrawledPage) -> Result<ExtractedDocument, ExtractError> {
        let page_url = Url::parse(&page.url).map_err(|source| ExtractError::InvalidUrl {
            url: page.url.clone(),
            source,
        })?;

        let document = Html::parse_document(&page.raw_html);
        let body_text = self.body_text(&document);

        Ok(ExtractedDocument {
            url: page.url.clone(),
            title: self.title(&document),
            meta_description: self.meta_description(&document),
            headings: self.headings(&document),
            body_length: body_text.chars().count(),
            body_text,
            crawled_at: page.fetched_at,
            depth: page.depth,
            outbound_links: self.outbound_links(&document, &page_url),
        })
    }

    /// Extracts every page, logging and dropping the ones that fail
    pub fn extract_all(&self, pages: &[CrawledPage]) -> Vec<ExtractedDocument> {
        let documents: Vec<ExtractedDocument> = pages
            .iter()
            .filter_map(|page| match self.extract(page) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::error!("Error parsing page {}: {}", page.url, e);
                    None
                }
            })
            .collect();

        tracing::info!("Parsed {} pages successfully", documents.len());
        documents
    }

    fn title(&self, document: &Html) -> String {
        // The <title> element wins even when empty, matching browsers
        if let Some(title) = document.select(&self.title).next() {
            return clean_text(&title.text().collect::<String>());
        }
        if let Some(h1) = document.select(&self.h1).next() {
            return clean_text(&h1.text().collect::<String>());
        }
        NO_TITLE.to_string()
    }

    fn meta_description(&self, document: &Html) -> String {
        document
            .select(&self.meta_description)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(clean_text)
            .unwrap_or_default()
    }

    fn body_text(&self, document: &Html) -> String {
        let containers: Vec<ElementRef<'_>> = document
            .select(&self.containers)
            .filter(|el| !is_stripped(*el) && is_content_container(*el))
            .collect();

        if containers.is_empty() {
            return document
                .select(&self.body)
                .next()
                .map(element_text)
                .unwrap_or_default();
        }

        let mut combined = String::new();
        for container in containers {
            combined.push_str(&element_text(container));
            combined.push(' ');
        }
        clean_text(&combined)
    }

    fn headings(&self, document: &Html) -> Vec<Heading> {
        document
            .select(&self.headings)
            .filter(|el| !is_stripped(*el))
            .filter_map(|el| {
                let level = el.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
                Some(Heading {
                    level,
                    text: element_text(el),
                })
            })
            .collect()
    }

    fn outbound_links(&self, document: &Html, page_url: &Url) -> Vec<OutboundLink> {
        document
            .select(&self.anchors)
            .filter(|el| !is_stripped(*el))
            .filter_map(|el| {
                let href = el.value().attr("href")?;
                let url = resolve_link(href, page_url)?;
                Some(OutboundLink {
                    url: url.to_string(),
                    text: element_text(el),
                    title: el.value().attr("title").unwrap_or_default().to_string(),
                })
            })
            .collect()
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{}: {:?}", css, e)))
}

fn is_content_container(element: ElementRef<'_>) -> bool {
    element
        .value()
        .attr("class")
        .map(|class| {
            let class = class.to_lowercase();
            CONTENT_CLASS_HINTS.iter().any(|hint| class.contains(hint))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> CrawledPage {
        CrawledPage {
            url: "https://example.com/docs/page".to_string(),
            raw_html: html.to_string(),
            fetched_at: Utc::now(),
            depth: 1,
        }
    }

    fn extract(html: &str) -> ExtractedDocument {
        Extractor::new().unwrap().extract(&page(html)).unwrap()
    }

    #[test]
    fn test_title_prefers_title_tag() {
        let doc = extract("<html><head><title>  The\n Title </title></head><body><h1>Heading</h1></body></html>");
        assert_eq!(doc.title, "The Title");
    }

    #[test]
    fn test_title_falls_back_to_h1_then_placeholder() {
        let doc = extract("<html><body><h1>Only Heading</h1></body></html>");
        assert_eq!(doc.title, "Only Heading");

        let doc = extract("<html><body><p>nothing</p></body></html>");
        assert_eq!(doc.title, NO_TITLE);
    }

    #[test]
    fn test_meta_description() {
        let doc = extract(
            r#"<html><head><meta name="description" content=" A  short
                summary "></head><body></body></html>"#,
        );
        assert_eq!(doc.meta_description, "A short summary");

        let doc = extract("<html><head></head><body></body></html>");
        assert_eq!(doc.meta_description, "");
    }

    #[test]
    fn test_body_prefers_content_containers() {
        let doc = extract(
            r#"<html><body>
                <p>outside text</p>
                <div class="Main-Content">inside   text</div>
                <article class="post-article">second</article>
            </body></html>"#,
        );
        assert_eq!(doc.body_text, "inside text second");
        assert_eq!(doc.body_length, "inside text second".chars().count());
    }

    #[test]
    fn test_body_falls_back_to_body_and_strips_chrome() {
        let doc = extract(
            r#"<html><body>
                <header>Site header</header>
                <nav>Menu</nav>
                <p>Real words</p>
                <script>var x = 1;</script>
                <aside>Sidebar</aside>
                <footer>Copyright</footer>
            </body></html>"#,
        );
        assert_eq!(doc.body_text, "Real words");
    }

    #[test]
    fn test_container_inside_nav_is_ignored() {
        let doc = extract(
            r#"<html><body><nav><div class="content">menu</div></nav><p>plain</p></body></html>"#,
        );
        assert_eq!(doc.body_text, "plain");
    }

    #[test]
    fn test_headings_in_document_order() {
        let doc = extract(
            "<html><body><h2>First</h2><h1>Second</h1><header><h1>Skip</h1></header><h6> Third </h6></body></html>",
        );
        let headings: Vec<(u8, &str)> = doc
            .headings
            .iter()
            .map(|h| (h.level, h.text.as_str()))
            .collect();
        assert_eq!(headings, vec![(2, "First"), (1, "Second"), (6, "Third")]);
        assert_eq!(doc.headings_text(), "First Second Third");
    }

    #[test]
    fn test_outbound_links() {
        let doc = extract(
            r#"<html><body>
                <a href="../other" title="Other page">Other  link</a>
                <a href="mailto:a@b.c">mail</a>
                <footer><a href="/legal">Legal</a></footer>
            </body></html>"#,
        );
        assert_eq!(
            doc.outbound_links,
            vec![OutboundLink {
                url: "https://example.com/other".to_string(),
                text: "Other link".to_string(),
                title: "Other page".to_string(),
            }]
        );
    }

    #[test]
    fn test_invalid_page_url_is_an_error() {
        let mut bad = page("<html></html>");
        bad.url = "not a url".to_string();
        let result = Extractor::new().unwrap().extract(&bad);
        assert!(matches!(result, Err(ExtractError::InvalidUrl { .. })));
    }

    #[test]
    fn test_extract_all_drops_failures() {
        let mut bad = page("<html></html>");
        bad.url = "::".to_string();
        let docs = Extractor::new()
            .unwrap()
            .extract_all(&[page("<title>ok</title>"), bad]);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "ok");
    }
}
