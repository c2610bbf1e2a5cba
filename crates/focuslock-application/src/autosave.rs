//! Debounced autosave of the open document.
//!
//! Every edit re-arms a single idle timer. When the timer runs out without a
//! newer edit, the latest content is written through the
//! `DocumentRepository`. Re-arming replaces the timer under the engine lock,
//! so at most one timer is ever pending.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use focuslock_core::config::AutosaveConfig;
use focuslock_core::document::{Document, DocumentRepository};
use focuslock_core::error::{FocusError, Result};

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Notifications for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveEvent {
    Saved {
        document_id: String,
        saved_at: DateTime<Utc>,
    },
    SaveFailed {
        document_id: String,
        error: FocusError,
    },
}

/// Debounced persistence for a single document.
pub struct AutosaveEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    repository: Arc<dyn DocumentRepository>,
    delay: Duration,
    saved_indicator: Duration,
    state: Mutex<EngineState>,
    events: broadcast::Sender<AutosaveEvent>,
}

struct EngineState {
    /// In-memory document; its content is the latest edit.
    document: Document,
    /// True while `document.content` differs from what was last persisted.
    dirty: bool,
    timer: Option<JoinHandle<()>>,
    /// Bumped whenever the timer is replaced or cancelled. A timer only
    /// flushes if its generation is still current.
    timer_generation: u64,
    last_saved: Option<(DateTime<Utc>, Instant)>,
    last_error: Option<FocusError>,
    closed: bool,
}

impl EngineState {
    fn cancel_timer(&mut self) {
        self.timer_generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl AutosaveEngine {
    /// Creates an engine for `document`, which is assumed to be persisted
    /// as-is.
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        document: Document,
        config: &AutosaveConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(EngineInner {
                repository,
                delay: config.delay(),
                saved_indicator: config.saved_indicator(),
                state: Mutex::new(EngineState {
                    document,
                    dirty: false,
                    timer: None,
                    timer_generation: 0,
                    last_saved: None,
                    last_error: None,
                    closed: false,
                }),
                events,
            }),
        }
    }

    /// Records `content` as the latest edit and restarts the idle timer.
    ///
    /// Must be called from within a tokio runtime. Ignored after `shutdown`.
    pub async fn notify_edit(&self, content: String) {
        let mut state = self.inner.state.lock().await;
        if state.closed {
            tracing::debug!("[Autosave] Ignoring edit after shutdown");
            return;
        }

        state.document.content = content;
        state.dirty = true;
        state.cancel_timer();

        let generation = state.timer_generation;
        let inner = Arc::clone(&self.inner);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            inner.flush_if_current(generation).await;
        }));
    }

    /// Saves pending content right away and cancels the idle timer.
    ///
    /// A no-op returning `Ok(())` when nothing is pending. On failure the
    /// content stays pending and a later call retries it.
    pub async fn force_flush(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        state.cancel_timer();
        self.inner.flush(&mut state).await
    }

    /// Cancels the idle timer for good and returns the in-memory document.
    ///
    /// Pending content is not written; callers flush first if they need it.
    pub async fn shutdown(&self) -> Document {
        let mut state = self.inner.state.lock().await;
        state.cancel_timer();
        state.closed = true;
        state.document.clone()
    }

    pub async fn is_dirty(&self) -> bool {
        self.inner.state.lock().await.dirty
    }

    /// The document as held in memory, including unsaved edits.
    pub async fn document(&self) -> Document {
        self.inner.state.lock().await.document.clone()
    }

    pub async fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.lock().await.last_saved.map(|(at, _)| at)
    }

    pub async fn last_error(&self) -> Option<FocusError> {
        self.inner.state.lock().await.last_error.clone()
    }

    /// True for the configured indicator duration after each successful save.
    pub async fn saved_indicator_visible(&self) -> bool {
        let state = self.inner.state.lock().await;
        state
            .last_saved
            .is_some_and(|(_, instant)| instant.elapsed() < self.inner.saved_indicator)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AutosaveEvent> {
        self.inner.events.subscribe()
    }
}

impl Drop for AutosaveEngine {
    fn drop(&mut self) {
        // The timer task holds its own reference to the inner state, so it
        // must be stopped explicitly.
        if let Ok(mut state) = self.inner.state.try_lock() {
            state.cancel_timer();
            state.closed = true;
        }
    }
}

impl EngineInner {
    async fn flush_if_current(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.closed || state.timer_generation != generation {
            return;
        }
        // This task is the timer; drop the handle without aborting ourselves.
        state.timer = None;
        // Failures are already logged and broadcast by `flush`.
        let _ = self.flush(&mut state).await;
    }

    async fn flush(&self, state: &mut EngineState) -> Result<()> {
        if !state.dirty {
            return Ok(());
        }

        let document_id = state.document.id.clone();
        match self.repository.save(&state.document).await {
            Ok(saved) => {
                state.document.modified_at = saved.modified_at;
                state.dirty = false;
                state.last_saved = Some((saved.modified_at, Instant::now()));
                state.last_error = None;
                tracing::debug!(
                    "[Autosave] Flushed document {} ({} bytes)",
                    document_id,
                    saved.content.len()
                );
                let _ = self.events.send(AutosaveEvent::Saved {
                    document_id,
                    saved_at: saved.modified_at,
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "[Autosave] Failed to flush document {}; keeping edits pending: {}",
                    document_id,
                    e
                );
                state.last_error = Some(e.clone());
                let _ = self.events.send(AutosaveEvent::SaveFailed {
                    document_id,
                    error: e.clone(),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryDocumentRepository;
    use tokio::time::sleep;

    const DELAY: Duration = Duration::from_secs(2);

    async fn engine_with_repo() -> (AutosaveEngine, Arc<MemoryDocumentRepository>) {
        let repo = Arc::new(MemoryDocumentRepository::new());
        let document = repo.create("Draft").await.unwrap();
        let engine = AutosaveEngine::new(repo.clone(), document, &AutosaveConfig::default());
        (engine, repo)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_edit_flushes_after_delay() {
        let (engine, repo) = engine_with_repo().await;

        engine.notify_edit("hello".to_string()).await;
        assert!(engine.is_dirty().await);

        sleep(DELAY - Duration::from_millis(100)).await;
        assert_eq!(repo.save_count(), 0);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(repo.save_count(), 1);
        assert_eq!(repo.saved()[0].content, "hello");
        assert!(!engine.is_dirty().await);
        assert!(engine.last_saved_at().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_flush_once_with_latest_content() {
        let (engine, repo) = engine_with_repo().await;

        for i in 0..10 {
            engine.notify_edit(format!("draft {}", i)).await;
            sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(repo.save_count(), 0);

        sleep(DELAY).await;
        let saved = repo.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].content, "draft 9");
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_separated_by_delay_flush_each_time() {
        let (engine, repo) = engine_with_repo().await;

        engine.notify_edit("one".to_string()).await;
        sleep(DELAY + Duration::from_millis(10)).await;
        engine.notify_edit("two".to_string()).await;
        sleep(DELAY + Duration::from_millis(10)).await;

        let contents: Vec<String> = repo.saved().into_iter().map(|d| d.content).collect();
        assert_eq!(contents, vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_flush_stays_dirty_and_force_flush_retries() {
        let (engine, repo) = engine_with_repo().await;
        let mut events = engine.subscribe();
        repo.set_fail_saves(true);

        engine.notify_edit("precious".to_string()).await;
        sleep(DELAY + Duration::from_millis(10)).await;

        assert!(engine.is_dirty().await);
        assert!(engine.last_error().await.unwrap().is_storage());
        assert!(matches!(
            events.recv().await.unwrap(),
            AutosaveEvent::SaveFailed { .. }
        ));
        assert_eq!(engine.document().await.content, "precious");

        repo.set_fail_saves(false);
        engine.force_flush().await.unwrap();

        assert!(!engine.is_dirty().await);
        assert_eq!(repo.saved()[0].content, "precious");
        assert!(matches!(
            events.recv().await.unwrap(),
            AutosaveEvent::Saved { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_flush_cancels_timer() {
        let (engine, repo) = engine_with_repo().await;

        engine.notify_edit("now".to_string()).await;
        engine.force_flush().await.unwrap();
        assert_eq!(repo.save_count(), 1);

        sleep(DELAY * 2).await;
        assert_eq!(repo.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_flush_without_edits_is_noop() {
        let (engine, repo) = engine_with_repo().await;
        engine.force_flush().await.unwrap();
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_prevents_stray_flush() {
        let (engine, repo) = engine_with_repo().await;

        engine.notify_edit("unsaved".to_string()).await;
        let document = engine.shutdown().await;
        assert_eq!(document.content, "unsaved");

        sleep(DELAY * 2).await;
        assert_eq!(repo.save_count(), 0);

        engine.notify_edit("ignored".to_string()).await;
        assert_eq!(engine.document().await.content, "unsaved");
    }

    #[tokio::test(start_paused = true)]
    async fn test_saved_indicator_clears() {
        let (engine, _repo) = engine_with_repo().await;

        engine.notify_edit("x".to_string()).await;
        engine.force_flush().await.unwrap();
        assert!(engine.saved_indicator_visible().await);

        sleep(Duration::from_millis(2100)).await;
        assert!(!engine.saved_indicator_visible().await);
    }
}
