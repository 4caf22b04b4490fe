use crate::core::config::IndexConfig;
use crate::core::error::Result;
use crate::core::stats::IndexStats;
use crate::core::types::{DocId, Document};
use crate::query::builder::{QueryBuilder, SearchOptions};
use crate::reader::snapshot::SnapshotController;
use crate::schema::schema::{
    FIELD_CONTENT, FIELD_DOC_ID, FIELD_FILENAME, FIELD_ORIGINAL_FILENAME, FIELD_UPLOAD_DATE,
    FIELD_UPLOAD_DATE_ISO, FIELD_USER_ID,
};
use crate::search::aggregate::{ResultAggregator, SearchResultEntry};
use crate::search::searcher::Searcher;
use crate::writer::index_writer::IndexWriter;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Display format for upload dates in search results
const UPLOAD_DATE_FORMAT: &str = "%b %d, %Y %I:%M %p (UTC)";

/// Metadata for one record in the backing document store
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    pub id: u64,
    pub filename: String,
    pub original_filename: String,
    pub upload_date: DateTime<Utc>,
    pub user_id: u64,
}

/// Collaborator that owns document records and their file contents.
/// The index never stores files itself; rebuilds replay the store.
pub trait DocumentStore: Send + Sync {
    fn get_document(&self, id: u64) -> Result<Option<DocumentMeta>>;

    fn list_all_documents(&self) -> Result<Vec<DocumentMeta>>;

    fn read_file_content(&self, meta: &DocumentMeta) -> Result<String>;

    fn document_count(&self) -> Result<usize> {
        Ok(self.list_all_documents()?.len())
    }
}

/// Assemble an index entry from store metadata and extracted content
pub fn build_document(meta: &DocumentMeta, content: &str) -> Document {
    let mut doc = Document::new(DocId(meta.id));
    doc.add_field(FIELD_DOC_ID, meta.id.to_string());
    doc.add_field(FIELD_FILENAME, meta.filename.as_str());
    doc.add_field(FIELD_ORIGINAL_FILENAME, meta.original_filename.as_str());
    doc.add_field(FIELD_CONTENT, content);
    doc.add_field(
        FIELD_UPLOAD_DATE,
        meta.upload_date.format(UPLOAD_DATE_FORMAT).to_string(),
    );
    doc.add_field(FIELD_UPLOAD_DATE_ISO, meta.upload_date.to_rfc3339());
    doc.add_field(FIELD_USER_ID, meta.user_id.to_string());
    doc
}

/// Facade over the whole engine: one writer behind a mutex, lock-free
/// snapshot reads for searches.
pub struct IndexService {
    config: IndexConfig,
    writer: Mutex<IndexWriter>,
    snapshots: SnapshotController,
    store: Arc<dyn DocumentStore>,
}

impl IndexService {
    pub fn open(config: IndexConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let writer = IndexWriter::open_or_create(&config)?;
        let snapshots = SnapshotController::new(writer.index().clone());
        tracing::info!(
            index_dir = %config.index_dir.display(),
            documents = writer.index().doc_count(),
            "Opened index"
        );

        Ok(IndexService {
            config,
            writer: Mutex::new(writer),
            snapshots,
            store,
        })
    }

    /// Index (or re-index) one document; commits before returning
    pub fn index_document(&self, meta: &DocumentMeta, content: &str) -> Result<()> {
        let doc = build_document(meta, content);
        self.writer.lock().add_or_replace(&doc, &self.snapshots)?;
        tracing::info!(doc_id = meta.id, filename = %meta.original_filename, "Indexed document");
        Ok(())
    }

    /// Remove a document from the index. Idempotent: removing an absent
    /// id succeeds and reports false.
    pub fn delete_document(&self, id: u64) -> Result<bool> {
        let removed = self.writer.lock().delete(DocId(id), &self.snapshots)?;
        if removed {
            tracing::info!(doc_id = id, "Deleted document from index");
        }
        Ok(removed)
    }

    /// Run a search against the latest committed snapshot. Empty or
    /// whitespace-only queries return no results without touching the
    /// index.
    pub fn search(
        &self,
        query: &str,
        options: &SearchOptions,
        limit: usize,
    ) -> Result<Vec<SearchResultEntry>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let parsed = QueryBuilder::new().build(query, options)?;
        let snapshot = self.snapshots.current();
        let raw = Searcher::new(&snapshot.index, self.config.result_cap).search(&parsed)?;

        let total_docs_in_system = self.store.document_count()?;
        let entries = ResultAggregator::new(&self.config, options).aggregate(
            &raw,
            &snapshot.index,
            limit,
            total_docs_in_system,
        );

        tracing::debug!(
            query,
            raw_matches = raw.len(),
            entries = entries.len(),
            snapshot = snapshot.version,
            "Search complete"
        );
        Ok(entries)
    }

    /// Drop the index and re-index everything in the document store.
    /// Returns the number of documents indexed; unreadable documents
    /// are skipped, not fatal.
    pub fn rebuild_index(&self) -> Result<usize> {
        let indexed = self
            .writer
            .lock()
            .rebuild(self.store.as_ref(), &self.snapshots)?;
        tracing::info!(indexed, "Index rebuild complete");
        Ok(indexed)
    }

    pub fn stats(&self) -> IndexStats {
        let snapshot = self.snapshots.current();
        IndexStats {
            total_documents: snapshot.index.doc_count(),
            total_terms: snapshot.index.term_count(),
            snapshot_version: snapshot.version,
            committed_at: snapshot.committed_at,
        }
    }
}
