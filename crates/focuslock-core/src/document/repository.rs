//! Document repository trait.
//!
//! Defines the interface for document persistence operations.

use async_trait::async_trait;

use super::model::{Document, DocumentSummary};
use crate::error::Result;

/// An abstract store for documents.
///
/// This trait decouples the session logic from the concrete storage
/// mechanism (one TOML file per document, in-memory test doubles, ...).
///
/// # Implementation Notes
///
/// Implementations must:
/// - Keep the in-memory index untouched when a save or delete fails
/// - Serialize writes so two saves to the same id never interleave
/// - Replace records atomically (old or new content, never a mix)
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Lists document metadata, newest-modified first. Never fails.
    async fn list(&self) -> Vec<DocumentSummary>;

    /// Finds a document by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Document))`: Document found
    /// - `Ok(None)`: No such document
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>>;

    /// Creates and persists an empty document.
    ///
    /// # Errors
    ///
    /// - `FocusError::Validation` if the title is empty
    /// - `FocusError::Storage` if the record cannot be written
    async fn create(&self, title: &str) -> Result<Document>;

    /// Persists the full document, bumping `modified_at`.
    ///
    /// Returns the document as stored (with the new `modified_at`).
    async fn save(&self, document: &Document) -> Result<Document>;

    /// Deletes a document. Deleting an unknown id is a no-op.
    async fn delete(&self, id: &str) -> Result<()>;
}
