//! Fixed index schema
//!
//! Field layout:
//! - `url`: raw token, stored; the unique document key
//! - `title`, `content`, `meta_description`, `headings`: English-stemmed
//!   full text with positions, stored
//! - `title_terms`: lowercased unstemmed title tokens, indexed only; feeds
//!   suggestions and popular terms
//! - `content_length`, `depth`: u64, stored
//! - `crawled_at`: unix seconds, stored

use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED,
    STRING,
};

/// Stemming analyzer registered by tantivy out of the box
pub const STEMMED_TOKENIZER: &str = "en_stem";

/// Lowercasing analyzer without stemming
pub const RAW_TERM_TOKENIZER: &str = "default";

/// Handles to every field of the schema
#[derive(Debug, Clone)]
pub struct IndexFields {
    pub schema: Schema,
    pub url: Field,
    pub title: Field,
    pub content: Field,
    pub meta_description: Field,
    pub headings: Field,
    pub title_terms: Field,
    pub content_length: Field,
    pub crawled_at: Field,
    pub depth: Field,
}

impl IndexFields {
    pub fn build() -> Self {
        let mut builder = Schema::builder();

        let stemmed = TextOptions::default()
            .set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(STEMMED_TOKENIZER)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            )
            .set_stored();

        let raw_terms = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(RAW_TERM_TOKENIZER)
                .set_index_option(IndexRecordOption::Basic),
        );

        let url = builder.add_text_field("url", STRING | STORED);
        let title = builder.add_text_field("title", stemmed.clone());
        let content = builder.add_text_field("content", stemmed.clone());
        let meta_description = builder.add_text_field("meta_description", stemmed.clone());
        let headings = builder.add_text_field("headings", stemmed);
        let title_terms = builder.add_text_field("title_terms", raw_terms);
        let content_length = builder.add_u64_field("content_length", INDEXED | STORED | FAST);
        let crawled_at = builder.add_i64_field("crawled_at", INDEXED | STORED | FAST);
        let depth = builder.add_u64_field("depth", INDEXED | STORED);

        Self {
            schema: builder.build(),
            url,
            title,
            content,
            meta_description,
            headings,
            title_terms,
            content_length,
            crawled_at,
            depth,
        }
    }

    /// Rebinds field handles against the schema of an existing index
    ///
    /// Fails if the on-disk index was built with a different layout.
    pub fn from_schema(schema: Schema) -> tantivy::Result<Self> {
        Ok(Self {
            url: schema.get_field("url")?,
            title: schema.get_field("title")?,
            content: schema.get_field("content")?,
            meta_description: schema.get_field("meta_description")?,
            headings: schema.get_field("headings")?,
            title_terms: schema.get_field("title_terms")?,
            content_length: schema.get_field("content_length")?,
            crawled_at: schema.get_field("crawled_at")?,
            depth: schema.get_field("depth")?,
            schema,
        })
    }
}
