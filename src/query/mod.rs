//! Query engine over the index store
//!
//! Sanitizes user queries, runs them against one or several text fields
//! and formats raw relevance-scored hits. Also derives query suggestions and
//! popular terms from the title term dictionary.

mod preprocess;

pub use preprocess::{sanitize_query, snippet, SNIPPET_CHARS};

use crate::index::{IndexFields, IndexStore};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::postings::TermInfo;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{DocSet, InvertedIndexReader, Score, SegmentReader, TantivyDocument, TERMINATED};
use thiserror::Error;

/// Errors that can occur while querying
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Search failed: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    #[error("Term dictionary read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Text fields a query can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Content,
    MetaDescription,
    Headings,
}

impl SearchField {
    /// The default multi-field target
    pub const ALL: [SearchField; 4] = [
        SearchField::Title,
        SearchField::Content,
        SearchField::MetaDescription,
        SearchField::Headings,
    ];

    fn field(self, fields: &IndexFields) -> Field {
        match self {
            SearchField::Title => fields.title,
            SearchField::Content => fields.content,
            SearchField::MetaDescription => fields.meta_description,
            SearchField::Headings => fields.headings,
        }
    }
}

/// A raw relevance-scored result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    /// Body text cut to [`SNIPPET_CHARS`] characters
    pub content_snippet: String,
    pub meta_description: String,
    pub headings: String,
    pub raw_relevance: f64,
    pub body_length: usize,
    pub crawled_at: Option<DateTime<Utc>>,
    pub depth: u32,
}

/// Read-side access to the index
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Arc<IndexStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<IndexStore>) -> Self {
        Self { store }
    }

    /// Searches the index
    ///
    /// # Arguments
    ///
    /// * `query` - Raw user query; sanitized before parsing
    /// * `limit` - Maximum number of hits returned
    /// * `fields` - Target fields; `None` or empty means all four text fields
    ///
    /// # Returns
    ///
    /// Hits ordered by descending relevance. A query that is empty after
    /// sanitizing yields no hits. Terms combine with OR, within and across
    /// fields.
    pub fn search(
        &self,
        query: &str,
        limit: usize,
        fields: Option<&[SearchField]>,
    ) -> QueryResult<Vec<SearchHit>> {
        let clean = sanitize_query(query);
        if clean.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let schema_fields = self.store.fields();
        let targets: Vec<Field> = fields
            .filter(|f| !f.is_empty())
            .unwrap_or(&SearchField::ALL)
            .iter()
            .map(|f| f.field(schema_fields))
            .collect();

        let parser = QueryParser::for_index(self.store.index(), targets);
        let (parsed, errors) = parser.parse_query_lenient(&clean);
        if !errors.is_empty() {
            tracing::debug!("Query '{}' parsed leniently: {:?}", clean, errors);
        }

        let searcher = self.store.searcher();
        let top_docs = searcher.search(&parsed, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            hits.push(self.to_hit(&doc, score));
        }

        tracing::info!("Search for '{}' returned {} results", query, hits.len());
        Ok(hits)
    }

    /// Title words starting with `partial`, strictly longer than it
    ///
    /// Matching is case-insensitive; results are lowercased, deduplicated
    /// and capped at `limit`.
    pub fn suggest(&self, partial: &str, limit: usize) -> QueryResult<Vec<String>> {
        let prefix = partial.trim().to_lowercase();
        if prefix.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let field = self.store.fields().title_terms;
        let searcher = self.store.searcher();
        let mut words = BTreeSet::new();

        for segment in searcher.segment_readers() {
            let inverted = segment.inverted_index(field)?;
            let mut stream = inverted.terms().range().ge(prefix.as_bytes()).into_stream()?;
            while stream.advance() {
                let Ok(term) = std::str::from_utf8(stream.key()) else {
                    continue;
                };
                if !term.starts_with(&prefix) {
                    break;
                }
                if term.len() > prefix.len()
                    && live_doc_freq(segment, &inverted, stream.value())? > 0
                {
                    words.insert(term.to_string());
                }
            }
        }

        Ok(words.into_iter().take(limit).collect())
    }

    /// Title terms longer than three characters, by document frequency
    ///
    /// This reflects the corpus, not a query log. Ties are broken
    /// alphabetically.
    pub fn popular_terms(&self, limit: usize) -> QueryResult<Vec<String>> {
        let field = self.store.fields().title_terms;
        let searcher = self.store.searcher();
        let mut frequencies: HashMap<String, u64> = HashMap::new();

        for segment in searcher.segment_readers() {
            let inverted = segment.inverted_index(field)?;
            let mut stream = inverted.terms().stream()?;
            while stream.advance() {
                let Ok(term) = std::str::from_utf8(stream.key()) else {
                    continue;
                };
                if term.chars().count() <= 3 {
                    continue;
                }
                let live = live_doc_freq(segment, &inverted, stream.value())?;
                if live > 0 {
                    *frequencies.entry(term.to_string()).or_default() += u64::from(live);
                }
            }
        }

        let mut ranked: Vec<(String, u64)> = frequencies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked.into_iter().take(limit).map(|(term, _)| term).collect())
    }

    fn to_hit(&self, doc: &TantivyDocument, score: Score) -> SearchHit {
        let f = self.store.fields();
        let text = |field: Field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let number = |field: Field| doc.get_first(field).and_then(|v| v.as_u64()).unwrap_or(0);

        SearchHit {
            url: text(f.url),
            title: text(f.title),
            content_snippet: snippet(&text(f.content)),
            meta_description: text(f.meta_description),
            headings: text(f.headings),
            raw_relevance: f64::from(score),
            body_length: number(f.content_length) as usize,
            crawled_at: doc
                .get_first(f.crawled_at)
                .and_then(|v| v.as_i64())
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            depth: u32::try_from(number(f.depth)).unwrap_or(u32::MAX),
        }
    }
}

/// Documents containing a term that are still alive in the segment
///
/// Replaced and deleted records stay in the term dictionary until a merge,
/// so the stored doc frequency alone overcounts.
fn live_doc_freq(
    segment: &SegmentReader,
    inverted: &InvertedIndexReader,
    term_info: &TermInfo,
) -> std::io::Result<u32> {
    let Some(alive) = segment.alive_bitset() else {
        return Ok(term_info.doc_freq);
    };

    let mut postings = inverted.read_postings_from_terminfo(term_info, IndexRecordOption::Basic)?;
    let mut live = 0;
    let mut doc = postings.doc();
    while doc != TERMINATED {
        if alive.is_alive(doc) {
            live += 1;
        }
        doc = postings.advance();
    }
    Ok(live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ExtractedDocument;
    use tempfile::TempDir;

    fn doc(url: &str, title: &str, body: &str) -> ExtractedDocument {
        ExtractedDocument {
            url: url.to_string(),
            title: title.to_string(),
            meta_description: String::new(),
            headings: Vec::new(),
            body_text: body.to_string(),
            body_length: body.chars().count(),
            crawled_at: Utc::now(),
            depth: 1,
            outbound_links: Vec::new(),
        }
    }

    fn engine_with(docs: &[ExtractedDocument]) -> (TempDir, QueryEngine) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(IndexStore::open(dir.path()).unwrap());
        store.bulk_upsert(docs).unwrap();
        (dir, QueryEngine::new(store))
    }

    #[test]
    fn test_search_uses_stemming() {
        let (_dir, engine) = engine_with(&[doc("https://a.test/", "Guide", "She was running quickly")]);
        let hits = engine.search("runs", 10, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://a.test/");
        assert_eq!(hits[0].depth, 1);
        assert!(hits[0].crawled_at.is_some());
        assert!(hits[0].raw_relevance > 0.0);
    }

    #[test]
    fn test_single_field_restricts_matches() {
        let (_dir, engine) = engine_with(&[
            doc("https://a.test/title", "Apple orchard", "trees"),
            doc("https://a.test/body", "Fruit", "an apple a day"),
        ]);

        let title_only = engine.search("apple", 10, Some(&[SearchField::Title])).unwrap();
        assert_eq!(title_only.len(), 1);
        assert_eq!(title_only[0].url, "https://a.test/title");

        let everywhere = engine.search("apple", 10, None).unwrap();
        assert_eq!(everywhere.len(), 2);
    }

    #[test]
    fn test_limit_bounds_results() {
        let docs: Vec<_> = (0..5)
            .map(|i| doc(&format!("https://a.test/{i}"), "Page", "common word"))
            .collect();
        let (_dir, engine) = engine_with(&docs);
        assert_eq!(engine.search("common", 3, None).unwrap().len(), 3);
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let (_dir, engine) = engine_with(&[doc("https://a.test/", "Title", "body")]);
        assert!(engine.search("!!! ...", 10, None).unwrap().is_empty());
        assert!(engine.search("body", 0, None).unwrap().is_empty());
    }

    #[test]
    fn test_snippet_is_truncated() {
        let body = "word ".repeat(100);
        let (_dir, engine) = engine_with(&[doc("https://a.test/", "Title", &body)]);
        let hits = engine.search("word", 1, None).unwrap();
        assert_eq!(hits[0].content_snippet.chars().count(), SNIPPET_CHARS + 3);
        assert_eq!(hits[0].body_length, 500);
    }

    #[test]
    fn test_suggest_prefix_words() {
        let (_dir, engine) = engine_with(&[
            doc("https://a.test/1", "Programming Rust", "x"),
            doc("https://a.test/2", "The Programmer Guide", "x"),
            doc("https://a.test/3", "Pro tips", "x"),
        ]);
        let suggestions = engine.suggest("PRO", 10).unwrap();
        assert_eq!(suggestions, vec!["programmer", "programming"]);
        assert_eq!(engine.suggest("pro", 1).unwrap().len(), 1);
        assert!(engine.suggest("  ", 5).unwrap().is_empty());
    }

    #[test]
    fn test_popular_terms_by_document_frequency() {
        let (_dir, engine) = engine_with(&[
            doc("https://a.test/1", "Rust async", "x"),
            doc("https://a.test/2", "Rust tokio", "x"),
            doc("https://a.test/3", "Go web", "x"),
        ]);
        let terms = engine.popular_terms(10).unwrap();
        assert_eq!(terms, vec!["rust", "async", "tokio"]);
        assert_eq!(engine.popular_terms(1).unwrap(), vec!["rust"]);
    }

    #[test]
    fn test_suggest_skips_replaced_titles() {
        let (_dir, engine) = engine_with(&[
            doc("https://a.test/a", "Football news", "x"),
            doc("https://a.test/z", "Other page", "x"),
        ]);
        engine
            .store
            .upsert(&doc("https://a.test/a", "Basketball news", "x"))
            .unwrap();

        assert_eq!(engine.store.stats().document_count, 2);
        assert!(engine.suggest("foot", 5).unwrap().is_empty());
        assert_eq!(engine.suggest("bask", 5).unwrap(), vec!["basketball"]);
    }

    #[test]
    fn test_popular_terms_count_live_records_only() {
        let (_dir, engine) = engine_with(&[
            doc("https://a.test/z1", "Zulu", "x"),
            doc("https://a.test/z2", "Zulu", "x"),
            doc("https://a.test/z3", "Zulu", "x"),
            doc("https://a.test/b1", "Bravo", "x"),
            doc("https://a.test/b2", "Bravo", "x"),
        ]);
        for _ in 0..3 {
            engine
                .store
                .upsert(&doc("https://a.test/a", "Alpha", "x"))
                .unwrap();
        }

        assert_eq!(
            engine.popular_terms(10).unwrap(),
            vec!["zulu", "bravo", "alpha"]
        );
    }
}
