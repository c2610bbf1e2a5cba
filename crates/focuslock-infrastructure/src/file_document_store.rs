//! File-backed `DocumentRepository` with an eagerly loaded in-memory index.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use focuslock_core::document::{
    Document, DocumentRepository, DocumentSummary, canonical_id, sort_index, validate_title,
};
use focuslock_core::error::{FocusError, Result};

use crate::dto::DocumentRecord;
use crate::storage::AtomicTomlFile;

/// Document store keeping one TOML record per document.
///
/// Directory structure:
/// ```text
/// documents_dir/
/// ├── 550e8400-e29b-41d4-a716-446655440000.toml
/// └── 6ba7b810-9dad-11d1-80b4-00c04fd430c8.toml
/// ```
///
/// All records are read once in [`FileDocumentStore::open`]. Afterwards the
/// in-memory index is the source of truth for reads, and every mutation
/// writes the file first and only touches the index once the write
/// succeeded.
///
/// Ids are canonicalized with [`canonical_id`] before they key the index or
/// name a file, so any spelling of a document's UUID refers to the same
/// record.
pub struct FileDocumentStore {
    dir: PathBuf,
    state: RwLock<IndexState>,
}

#[derive(Default)]
struct IndexState {
    documents: HashMap<String, Document>,
    /// Derived view, rebuilt after every mutation.
    index: Vec<DocumentSummary>,
}

impl IndexState {
    fn from_documents(documents: HashMap<String, Document>) -> Self {
        let mut state = Self {
            documents,
            index: Vec::new(),
        };
        state.rebuild_index();
        state
    }

    fn rebuild_index(&mut self) {
        self.index = self.documents.values().map(Document::summary).collect();
        sort_index(&mut self.index);
    }
}

impl FileDocumentStore {
    /// Opens (creating if needed) the store at `dir` and loads every
    /// readable record.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Storage` only when the directory itself cannot be
    /// created or listed. Individual broken records are skipped.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            FocusError::storage(format!("Failed to create documents directory {:?}: {}", dir, e))
        })?;

        let documents = load_documents(&dir)?;
        tracing::info!(
            "[DocumentStore] Loaded {} document(s) from {:?}",
            documents.len(),
            dir
        );

        Ok(Self {
            dir,
            state: RwLock::new(IndexState::from_documents(documents)),
        })
    }

    pub fn documents_dir(&self) -> &Path {
        &self.dir
    }

    /// Record handle for an id already passed through [`canonical_id`].
    fn record_file(&self, canonical: &str) -> AtomicTomlFile<DocumentRecord> {
        AtomicTomlFile::new(self.dir.join(format!("{}.toml", canonical)))
    }

    fn write_record(&self, document: &Document) -> Result<()> {
        self.record_file(&document.id)
            .save(&DocumentRecord::from(document))
            .map_err(|e| {
                tracing::warn!(
                    "[DocumentStore] Failed to write document {}: {}",
                    document.id,
                    e
                );
                FocusError::from(e)
            })
    }
}

#[async_trait]
impl DocumentRepository for FileDocumentStore {
    async fn list(&self) -> Vec<DocumentSummary> {
        self.state.read().await.index.clone()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>> {
        let Some(id) = canonical_id(id) else {
            return Ok(None);
        };
        Ok(self.state.read().await.documents.get(&id).cloned())
    }

    async fn create(&self, title: &str) -> Result<Document> {
        let document = Document::new(title)?;

        let mut state = self.state.write().await;
        self.write_record(&document)?;
        state
            .documents
            .insert(document.id.clone(), document.clone());
        state.rebuild_index();

        tracing::info!(
            "[DocumentStore] Created document {} ({})",
            document.id,
            document.title
        );
        Ok(document)
    }

    async fn save(&self, document: &Document) -> Result<Document> {
        let mut updated = document.clone();
        updated.id = canonical_id(&document.id).ok_or_else(|| {
            FocusError::validation(format!("Invalid document id '{}'", document.id))
        })?;
        updated.title = validate_title(&document.title)?;
        updated.modified_at = document.next_modified_at();

        // The write guard is held across the file write so writers never
        // interleave and the index flips only after the rename.
        let mut state = self.state.write().await;
        self.write_record(&updated)?;
        state.documents.insert(updated.id.clone(), updated.clone());
        state.rebuild_index();

        tracing::debug!(
            "[DocumentStore] Saved document {} ({} bytes)",
            updated.id,
            updated.content.len()
        );
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let Some(id) = canonical_id(id) else {
            return Ok(());
        };

        let mut state = self.state.write().await;
        self.record_file(&id).remove().map_err(|e| {
            tracing::warn!("[DocumentStore] Failed to delete document {}: {}", id, e);
            FocusError::from(e)
        })?;
        if state.documents.remove(&id).is_some() {
            state.rebuild_index();
            tracing::info!("[DocumentStore] Deleted document {}", id);
        }
        Ok(())
    }
}

/// Reads every `<uuid>.toml` record in `dir`, skipping the broken ones.
fn load_documents(dir: &Path) -> Result<HashMap<String, Document>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        FocusError::storage(format!("Failed to list documents directory {:?}: {}", dir, e))
    })?;

    let mut documents = HashMap::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!("[DocumentStore] Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        if !is_record_path(&path) {
            continue;
        }

        match load_document(&path) {
            Ok(document) => {
                documents.insert(document.id.clone(), document);
            }
            Err(e) => {
                tracing::warn!("[DocumentStore] Skipping record {:?}: {}", path, e);
            }
        }
    }
    Ok(documents)
}

fn is_record_path(path: &Path) -> bool {
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_none_or(|name| name.starts_with('.'));
    is_toml && !hidden && path.is_file()
}

fn load_document(path: &Path) -> Result<Document> {
    let record = AtomicTomlFile::<DocumentRecord>::new(path.to_path_buf())
        .load()?
        .ok_or_else(|| FocusError::storage("Record file is empty"))?;

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    if canonical_id(stem).as_deref() != Some(stem) || stem != record.id {
        return Err(FocusError::validation(format!(
            "Record id '{}' does not match file name",
            record.id
        )));
    }

    Document::try_from(record)
}
