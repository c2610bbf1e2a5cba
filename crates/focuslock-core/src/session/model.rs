//! Session projections handed to presentation layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::FocusError;

/// Read-only view of the active writing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The document as currently held in memory (may be ahead of disk).
    pub document: Document,
    /// True between an edit and its next successful save.
    pub dirty: bool,
    /// Mirrors the last command sent to the network gate.
    pub network_disabled: bool,
    /// Number of exit secrets accepted so far.
    pub exit_stage: usize,
    /// True once `request_exit` was called and not yet cancelled.
    pub exit_pending: bool,
    /// True for a short while after a successful save.
    pub saved_indicator: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// Result of an exit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The session is torn down and the network re-enabled.
    ///
    /// `flush_error` carries a failed final save; `document` still holds the
    /// unsaved content so the caller can persist it again.
    Granted {
        document: Document,
        flush_error: Option<FocusError>,
    },
    /// Wrong secret for the current stage, or more stages remain.
    /// The session stays active and isolated.
    Denied { stage: usize },
}

impl ExitOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}
