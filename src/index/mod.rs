//! Index store for extracted documents
//!
//! This module owns the on-disk full-text index:
//! - The fixed field schema
//! - Upsert keyed by URL, single or batched, in one commit
//! - Snapshot statistics and segment compaction
//!
//! Writers are serialized behind one mutex; readers search the last
//! committed snapshot.

mod schema;
mod store;

pub use schema::{IndexFields, RAW_TERM_TOKENIZER, STEMMED_TOKENIZER};
pub use store::IndexStore;

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index engine error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    #[error("Failed to open index directory: {0}")]
    OpenDirectory(#[from] tantivy::directory::error::OpenDirectoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index writer lock poisoned")]
    Poisoned,
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Snapshot statistics of the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub document_count: u64,
    pub segment_count: usize,
    pub location: PathBuf,
}
