//! Document record DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use focuslock_core::FocusError;
use focuslock_core::document::{Document, validate_title};
use focuslock_core::error::Result;

/// Current on-disk schema version of a document record.
pub const DOCUMENT_SCHEMA_VERSION: &str = "1.0.0";

/// On-disk shape of a document (`<id>.toml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub schema_version: String,
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub modified_at: String,
    /// Serialized after the metadata fields.
    pub content: String,
}

impl From<&Document> for DocumentRecord {
    fn from(doc: &Document) -> Self {
        DocumentRecord {
            schema_version: DOCUMENT_SCHEMA_VERSION.to_string(),
            id: doc.id.clone(),
            title: doc.title.clone(),
            created_at: doc.created_at.to_rfc3339(),
            modified_at: doc.modified_at.to_rfc3339(),
            content: doc.content.clone(),
        }
    }
}

impl TryFrom<DocumentRecord> for Document {
    type Error = FocusError;

    /// Rejects records that violate document invariants.
    fn try_from(record: DocumentRecord) -> Result<Self> {
        if record.schema_version != DOCUMENT_SCHEMA_VERSION {
            return Err(FocusError::Serialization {
                format: "TOML".to_string(),
                message: format!("Unsupported schema version {}", record.schema_version),
            });
        }

        let title = validate_title(&record.title)?;
        let created_at = parse_timestamp(&record.created_at)?;
        let modified_at = parse_timestamp(&record.modified_at)?;
        if modified_at < created_at {
            return Err(FocusError::validation(format!(
                "modified_at {} precedes created_at {}",
                record.modified_at, record.created_at
            )));
        }

        Ok(Document {
            id: record.id,
            title,
            content: record.content,
            created_at,
            modified_at,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
