//! The focus session controller.
//!
//! Owns the single active writing session and is the only component that
//! talks to the `NetworkGate`. Network access is disabled exactly while a
//! session is active.

use std::sync::Arc;
use tokio::sync::broadcast;

use focuslock_core::config::AutosaveConfig;
use focuslock_core::document::{Document, DocumentRepository, DocumentSummary, canonical_id};
use focuslock_core::error::{FocusError, Result};
use focuslock_core::exit::ExitAuthenticator;
use focuslock_core::network::NetworkGate;
use focuslock_core::session::{ExitOutcome, SessionSnapshot};

use crate::autosave::{AutosaveEngine, AutosaveEvent};

struct ActiveSession {
    document_id: String,
    autosave: AutosaveEngine,
    authenticator: ExitAuthenticator,
    exit_pending: bool,
}

/// Entry point for every UI command of the writing app.
///
/// Methods that change session state take `&mut self`, so commands are
/// applied one at a time in the order the caller issues them.
pub struct SessionController {
    repository: Arc<dyn DocumentRepository>,
    network_gate: Arc<dyn NetworkGate>,
    autosave_config: AutosaveConfig,
    session: Option<ActiveSession>,
    /// Last state commanded to the gate.
    network_disabled: bool,
}

impl SessionController {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        network_gate: Arc<dyn NetworkGate>,
        autosave_config: AutosaveConfig,
    ) -> Self {
        Self {
            repository,
            network_gate,
            autosave_config,
            session: None,
            network_disabled: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Id of the document being edited, if any.
    pub fn active_document_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.document_id.as_str())
    }

    // ============================================================================
    // Document list commands
    // ============================================================================

    pub async fn document_index(&self) -> Vec<DocumentSummary> {
        self.repository.list().await
    }

    pub async fn new_document(&self, title: &str) -> Result<Document> {
        self.repository.create(title).await
    }

    /// Deletes a document. The document of the active session cannot be
    /// deleted, whichever spelling of its id is used.
    pub async fn delete_document(&self, id: &str) -> Result<()> {
        if let Some(active) = self.active_document_id() {
            let target = canonical_id(id);
            if active == id || (target.is_some() && target == canonical_id(active)) {
                return Err(FocusError::SessionActive {
                    document_id: active.to_string(),
                });
            }
        }
        self.repository.delete(id).await
    }

    /// Persists a document outside of any session, e.g. to retry a final
    /// save that failed during a granted exit.
    pub async fn save_document(&self, document: &Document) -> Result<Document> {
        self.repository.save(document).await
    }

    // ============================================================================
    // Session lifecycle
    // ============================================================================

    /// Looks up `id` and opens a session on it.
    pub async fn open_document(&mut self, id: &str) -> Result<SessionSnapshot> {
        self.ensure_idle()?;
        let document = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| FocusError::not_found("Document", id))?;
        self.open_session(document).await
    }

    /// Starts a session: resets the exit challenge and cuts network access.
    ///
    /// # Errors
    ///
    /// `FocusError::SessionActive` if a session is already open.
    pub async fn open_session(&mut self, document: Document) -> Result<SessionSnapshot> {
        self.ensure_idle()?;

        let document_id = document.id.clone();
        let autosave = AutosaveEngine::new(
            Arc::clone(&self.repository),
            document,
            &self.autosave_config,
        );
        let authenticator = ExitAuthenticator::new();

        self.network_gate.disable();
        self.network_disabled = true;
        self.session = Some(ActiveSession {
            document_id: document_id.clone(),
            autosave,
            authenticator,
            exit_pending: false,
        });

        tracing::info!("[SessionController] Opened session for document {}", document_id);
        self.snapshot().await
    }

    /// Replaces the document content and schedules an autosave.
    pub async fn edit(&mut self, content: impl Into<String>) -> Result<()> {
        let session = self.active_mut()?;
        session.autosave.notify_edit(content.into()).await;
        Ok(())
    }

    /// Saves pending edits now. Network and exit state are untouched.
    pub async fn explicit_save(&mut self) -> Result<()> {
        let session = self.active_mut()?;
        session.autosave.force_flush().await
    }

    /// Signals that the exit challenge should be shown. Idempotent.
    pub fn request_exit(&mut self) -> Result<()> {
        let session = self.active_mut()?;
        if !session.exit_pending {
            session.exit_pending = true;
            tracing::debug!(
                "[SessionController] Exit requested at stage {}",
                session.authenticator.stage()
            );
        }
        Ok(())
    }

    /// Dismisses the exit challenge. The session stays open and isolated.
    pub fn cancel_exit_attempt(&mut self) -> Result<()> {
        let session = self.active_mut()?;
        session.authenticator.reset();
        session.exit_pending = false;
        tracing::debug!("[SessionController] Exit challenge cancelled");
        Ok(())
    }

    /// Submits one exit secret.
    ///
    /// On the final correct secret the pending edits are flushed, network
    /// access is restored and the session is torn down, even if that final
    /// flush fails (the failure is reported in the outcome).
    pub async fn attempt_exit(&mut self, candidate: &str) -> Result<ExitOutcome> {
        let session = self.active_mut()?;
        session.exit_pending = true;

        let result = session.authenticator.submit(candidate);
        if !result.unlocked {
            let stage = session.authenticator.stage();
            if result.accepted {
                tracing::info!("[SessionController] Exit stage {} passed", stage);
            } else {
                tracing::info!("[SessionController] Exit denied at stage {}", stage);
            }
            return Ok(ExitOutcome::Denied { stage });
        }

        let flush_error = session.autosave.force_flush().await.err();
        if let Some(e) = &flush_error {
            tracing::warn!(
                "[SessionController] Final save failed, releasing session anyway: {}",
                e
            );
        }

        let document = self.teardown().await?;
        tracing::info!("[SessionController] Exit granted for document {}", document.id);
        Ok(ExitOutcome::Granted {
            document,
            flush_error,
        })
    }

    /// Ends the session without the exit challenge, for process shutdown
    /// paths. Attempts a final save and always restores network access.
    pub async fn shutdown(&mut self) -> Option<Document> {
        let session = self.session.as_ref()?;
        if let Err(e) = session.autosave.force_flush().await {
            tracing::warn!("[SessionController] Final save during shutdown failed: {}", e);
        }
        let document = self.teardown().await.ok()?;
        tracing::info!("[SessionController] Session for {} shut down", document.id);
        Some(document)
    }

    // ============================================================================
    // Observable state
    // ============================================================================

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let session = self.session.as_ref().ok_or(FocusError::NoActiveSession)?;
        Ok(SessionSnapshot {
            document: session.autosave.document().await,
            dirty: session.autosave.is_dirty().await,
            network_disabled: self.network_disabled,
            exit_stage: session.authenticator.stage(),
            exit_pending: session.exit_pending,
            saved_indicator: session.autosave.saved_indicator_visible().await,
            last_saved_at: session.autosave.last_saved_at().await,
        })
    }

    pub fn exit_stage_count(&self) -> Option<usize> {
        self.session
            .as_ref()
            .map(|s| s.authenticator.stage_count())
    }

    pub fn subscribe_autosave(&self) -> Option<broadcast::Receiver<AutosaveEvent>> {
        self.session.as_ref().map(|s| s.autosave.subscribe())
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn ensure_idle(&self) -> Result<()> {
        match &self.session {
            Some(session) => Err(FocusError::SessionActive {
                document_id: session.document_id.clone(),
            }),
            None => Ok(()),
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveSession> {
        self.session.as_mut().ok_or(FocusError::NoActiveSession)
    }

    /// Restores network access, then stops the autosave timer and hands
    /// back the in-memory document.
    async fn teardown(&mut self) -> Result<Document> {
        let session = self.session.take().ok_or(FocusError::NoActiveSession)?;
        self.network_gate.enable();
        self.network_disabled = false;
        Ok(session.autosave.shutdown().await)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.network_disabled {
            tracing::warn!(
                "[SessionController] Dropped with active session {:?}; restoring network",
                self.active_document_id()
            );
            self.network_gate.enable();
        }
    }
}
