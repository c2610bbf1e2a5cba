//! In-memory test doubles for the application layer.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use focuslock_core::document::{
    Document, DocumentRepository, DocumentSummary, sort_index, validate_title,
};
use focuslock_core::error::{FocusError, Result};
use focuslock_core::network::NetworkGate;

/// `DocumentRepository` kept entirely in memory, recording every save and
/// able to simulate write failures.
#[derive(Default)]
pub struct MemoryDocumentRepository {
    documents: Mutex<HashMap<String, Document>>,
    saved: Mutex<Vec<Document>>,
    fail_saves: AtomicBool,
}

impl MemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Every successful save, oldest first.
    pub fn saved(&self) -> Vec<Document> {
        self.saved.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn list(&self) -> Vec<DocumentSummary> {
        let mut index: Vec<DocumentSummary> = self
            .documents
            .lock()
            .unwrap()
            .values()
            .map(Document::summary)
            .collect();
        sort_index(&mut index);
        index
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.documents.lock().unwrap().get(id).cloned())
    }

    async fn create(&self, title: &str) -> Result<Document> {
        let document = Document::new(title)?;
        self.documents
            .lock()
            .unwrap()
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn save(&self, document: &Document) -> Result<Document> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(FocusError::storage("simulated disk failure"));
        }
        let mut updated = document.clone();
        updated.title = validate_title(&document.title)?;
        updated.modified_at = document.next_modified_at();
        self.documents
            .lock()
            .unwrap()
            .insert(updated.id.clone(), updated.clone());
        self.saved.lock().unwrap().push(updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.documents.lock().unwrap().remove(id);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCommand {
    Disable,
    Enable,
}

/// `NetworkGate` that only records the commands it receives.
#[derive(Default)]
pub struct RecordingNetworkGate {
    commands: Mutex<Vec<GateCommand>>,
}

impl RecordingNetworkGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<GateCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// True when the most recent command disabled the network.
    pub fn is_disabled(&self) -> bool {
        self.commands.lock().unwrap().last() == Some(&GateCommand::Disable)
    }
}

impl NetworkGate for RecordingNetworkGate {
    fn disable(&self) {
        self.commands.lock().unwrap().push(GateCommand::Disable);
    }

    fn enable(&self) {
        self.commands.lock().unwrap().push(GateCommand::Enable);
    }
}
