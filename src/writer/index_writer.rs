use crate::core::config::IndexConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::service::{build_document, DocumentStore};
use crate::core::types::{DocId, Document};
use crate::analysis::analyzer::Analyzer;
use crate::index::inverted::InvertedIndex;
use crate::reader::snapshot::SnapshotController;
use crate::schema::schema::document_schema;
use crate::storage::file_lock::WriterLock;
use crate::storage::layout::StorageLayout;
use crate::storage::manifest::Manifest;
use crate::storage::segment::SegmentId;
use crate::storage::segment_reader::SegmentReader;
use crate::storage::segment_writer::SegmentWriter;
use std::sync::Arc;

/// Single-writer mutation path. Every operation that changes the index
/// ends in a commit: snapshot serialized to a fresh segment, manifest
/// renamed over the previous pointer, new snapshot published to readers.
pub struct IndexWriter {
    layout: StorageLayout,
    analyzer: Analyzer,
    index: InvertedIndex,
    current_segment: Option<SegmentId>,
    _lock: WriterLock,
}

impl IndexWriter {
    /// Open the committed index state, or start empty when no commit
    /// exists yet. A loadable manifest pointing at an unreadable or
    /// corrupt segment surfaces as IndexUnavailable.
    pub fn open_or_create(config: &IndexConfig) -> Result<Self> {
        let layout = StorageLayout::new(&config.index_dir)?;
        let lock = WriterLock::acquire(&layout)?;

        let (index, current_segment) = match Manifest::load(&layout)? {
            Some(manifest) => {
                let mut index = SegmentReader::new(&layout)
                    .read(&manifest.segment_id)
                    .map_err(|e| {
                        Error::new(
                            ErrorKind::IndexUnavailable,
                            format!("Committed segment {} unreadable: {}", manifest.segment_id, e),
                        )
                    })?;
                index.rebuild_prefix_indexes()?;
                (index, Some(manifest.segment_id))
            }
            None => (InvertedIndex::new(document_schema()), None),
        };

        Ok(IndexWriter {
            layout,
            analyzer: Analyzer::indexing(),
            index,
            current_segment,
            _lock: lock,
        })
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Add a document, superseding any previous entry with the same id,
    /// and commit. A failed commit rolls the in-memory state back so the
    /// rejected write can never leak into a later commit.
    pub fn add_or_replace(&mut self, doc: &Document, snapshots: &SnapshotController) -> Result<()> {
        let before = self.index.clone();
        self.index.add_document(doc, &self.analyzer)?;
        if let Err(e) = self.commit(snapshots) {
            self.index = before;
            return Err(e);
        }
        Ok(())
    }

    /// Delete a document and commit. Deleting an absent id is a no-op
    /// and returns false without committing. A failed commit rolls the
    /// removal back.
    pub fn delete(&mut self, doc_id: DocId, snapshots: &SnapshotController) -> Result<bool> {
        let before = self.index.clone();
        if !self.index.remove_document(doc_id) {
            return Ok(false);
        }
        if let Err(e) = self.commit(snapshots) {
            self.index = before;
            return Err(e);
        }
        Ok(true)
    }

    /// Discard the current index and re-index every document in the
    /// store. Documents whose content cannot be read are skipped and
    /// logged; the rebuild continues. Commits exactly once, at the end;
    /// the previous state stays live if that commit fails.
    pub fn rebuild(
        &mut self,
        store: &dyn DocumentStore,
        snapshots: &SnapshotController,
    ) -> Result<usize> {
        let mut fresh = InvertedIndex::new(document_schema());

        let mut indexed = 0usize;
        for meta in store.list_all_documents()? {
            match store.read_file_content(&meta) {
                Ok(content) => {
                    let doc = build_document(&meta, &content);
                    fresh.add_document(&doc, &self.analyzer)?;
                    indexed += 1;
                }
                Err(e) => {
                    tracing::error!(
                        doc_id = meta.id,
                        filename = %meta.original_filename,
                        error = %e,
                        "Skipping unreadable document during rebuild"
                    );
                }
            }
        }

        let before = std::mem::replace(&mut self.index, fresh);
        if let Err(e) = self.commit(snapshots) {
            self.index = before;
            return Err(e);
        }
        Ok(indexed)
    }

    /// Persist the current state and make it visible to readers
    pub fn commit(&mut self, snapshots: &SnapshotController) -> Result<()> {
        self.index.rebuild_prefix_indexes()?;

        let segment_id = SegmentWriter::new(&self.layout).write(&self.index)?;
        Manifest::new(segment_id, self.index.doc_count()).commit(&self.layout)?;
        self.current_segment = Some(segment_id);

        snapshots.publish(Arc::new(self.index.clone()));
        self.sweep_stale_segments(segment_id);
        Ok(())
    }

    /// Remove segment files the manifest no longer points at. Failures
    /// here waste disk but never affect correctness.
    fn sweep_stale_segments(&self, live: SegmentId) {
        let segments = match self.layout.list_segments() {
            Ok(segments) => segments,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list segments for cleanup");
                return;
            }
        };

        for (id, path) in segments {
            if id == live {
                continue;
            }
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(segment = %id, error = %e, "Failed to remove stale segment");
            }
        }
    }
}
