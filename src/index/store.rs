//! Tantivy-backed index store

use crate::extractor::ExtractedDocument;
use crate::index::{IndexError, IndexFields, IndexResult, IndexStats};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tantivy::collector::Count;
use tantivy::directory::MmapDirectory;
use tantivy::query::TermQuery;
use tantivy::schema::IndexRecordOption;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term};

/// Heap given to the single indexing thread
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Full-text index of extracted documents, one record per URL
pub struct IndexStore {
    index: Index,
    fields: IndexFields,
    writer: Mutex<IndexWriter>,
    reader: IndexReader,
    path: PathBuf,
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl IndexStore {
    /// Opens the index at `path`, creating it if absent
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created or holds an index with a
    /// different schema.
    pub fn open(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)?;

        let directory = MmapDirectory::open(&path)?;
        let index = Index::open_or_create(directory, IndexFields::build().schema)?;
        let fields = IndexFields::from_schema(index.schema())?;

        let writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        tracing::info!("Opened index at {}", path.display());

        Ok(Self {
            index,
            fields,
            writer: Mutex::new(writer),
            reader,
            path,
        })
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn fields(&self) -> &IndexFields {
        &self.fields
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the last committed state
    pub fn searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    /// Replaces the record for `doc.url`, or inserts it
    pub fn upsert(&self, doc: &ExtractedDocument) -> IndexResult<()> {
        self.bulk_upsert(std::slice::from_ref(doc)).map(|_| ())
    }

    /// Upserts a batch of documents in a single commit
    ///
    /// Either every document becomes visible or, on any failure, none does:
    /// the writer is rolled back and the error returned.
    ///
    /// # Returns
    ///
    /// The number of documents written.
    pub fn bulk_upsert(&self, docs: &[ExtractedDocument]) -> IndexResult<usize> {
        let mut writer = self.lock_writer()?;

        let result = docs
            .iter()
            .try_for_each(|doc| {
                writer.delete_term(Term::from_field_text(self.fields.url, &doc.url));
                writer.add_document(self.to_document(doc)).map(|_| ())
            })
            .and_then(|()| writer.commit().map(|_| ()));

        if let Err(e) = result {
            tracing::error!("Index write failed, rolling back {} documents: {}", docs.len(), e);
            if let Err(rollback_err) = writer.rollback() {
                tracing::error!("Index rollback failed: {}", rollback_err);
            }
            return Err(e.into());
        }
        drop(writer);

        self.reader.reload()?;
        tracing::info!("Indexed {} documents", docs.len());
        Ok(docs.len())
    }

    /// Removes the record for `url`, if any
    pub fn delete(&self, url: &str) -> IndexResult<()> {
        let mut writer = self.lock_writer()?;
        writer.delete_term(Term::from_field_text(self.fields.url, url));
        if let Err(e) = writer.commit() {
            if let Err(rollback_err) = writer.rollback() {
                tracing::error!("Index rollback failed: {}", rollback_err);
            }
            return Err(e.into());
        }
        drop(writer);

        self.reader.reload()?;
        Ok(())
    }

    /// Number of live records stored under exactly `url`
    pub fn count_url(&self, url: &str) -> IndexResult<usize> {
        let query = TermQuery::new(
            Term::from_field_text(self.fields.url, url),
            IndexRecordOption::Basic,
        );
        Ok(self.searcher().search(&query, &Count)?)
    }

    /// Document count and location, read from the current snapshot
    pub fn stats(&self) -> IndexStats {
        let searcher = self.searcher();
        IndexStats {
            document_count: searcher.num_docs(),
            segment_count: searcher.segment_readers().len(),
            location: self.path.clone(),
        }
    }

    /// Merges all searchable segments into one and drops unused files
    ///
    /// A lone segment is rewritten too when it still holds deleted records,
    /// so replaced documents leave the term dictionary. Readers holding an
    /// older snapshot keep working; the merged segment becomes visible on the
    /// next reload.
    pub fn optimize(&self) -> IndexResult<()> {
        let mut writer = self.lock_writer()?;

        let segments = self.index.searchable_segment_metas()?;
        let deleted: u32 = segments.iter().map(|meta| meta.num_deleted_docs()).sum();
        if segments.len() > 1 || deleted > 0 {
            tracing::info!(
                "Merging {} segments ({} deleted documents)",
                segments.len(),
                deleted
            );
            let segment_ids: Vec<_> = segments.iter().map(|meta| meta.id()).collect();
            writer.merge(&segment_ids).wait()?;
        }
        writer.garbage_collect_files().wait()?;
        drop(writer);

        self.reader.reload()?;
        tracing::info!("Index optimization completed");
        Ok(())
    }

    fn lock_writer(&self) -> IndexResult<MutexGuard<'_, IndexWriter>> {
        self.writer.lock().map_err(|_| IndexError::Poisoned)
    }

    fn to_document(&self, doc: &ExtractedDocument) -> TantivyDocument {
        let f = &self.fields;
        let mut document = TantivyDocument::default();
        document.add_text(f.url, &doc.url);
        document.add_text(f.title, &doc.title);
        document.add_text(f.title_terms, &doc.title);
        document.add_text(f.content, &doc.body_text);
        document.add_text(f.meta_description, &doc.meta_description);
        document.add_text(f.headings, doc.headings_text());
        document.add_u64(f.content_length, doc.body_length as u64);
        document.add_i64(f.crawled_at, doc.crawled_at.timestamp());
        document.add_u64(f.depth, u64::from(doc.depth));
        document
    }
}
