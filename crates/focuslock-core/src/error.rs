//! Error types for focuslock.

use thiserror::Error;

/// A shared error type for the entire focuslock workspace.
///
/// Wrong exit passphrases are deliberately absent here: a denied exit is a
/// normal outcome (`ExitOutcome::Denied`), not a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FocusError {
    /// Bad input from the caller. Nothing was mutated.
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O failure while loading, saving or deleting a record
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "RFC3339", ...
        message: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A writing session is already open
    #[error("A session is already active for document '{document_id}'")]
    SessionActive { document_id: String },

    /// Session operation issued with no session open
    #[error("No active session")]
    NoActiveSession,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FocusError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Storage and serialization failures both count as storage problems
    /// from the caller's point of view.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Serialization { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FocusError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<toml::de::Error> for FocusError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FocusError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for FocusError {
    fn from(err: chrono::ParseError) -> Self {
        Self::Serialization {
            format: "RFC3339".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FocusError>`.
pub type Result<T> = std::result::Result<T, FocusError>;
