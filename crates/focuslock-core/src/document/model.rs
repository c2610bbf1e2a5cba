//! Document domain model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FocusError, Result};

/// A single piece of writing.
///
/// `created_at` never changes after creation and `modified_at` is bumped on
/// every successful save, so `modified_at >= created_at` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier (UUID v4), stable for the document's lifetime.
    pub id: String,
    /// Non-empty display title.
    pub title: String,
    /// Full text body. Replaced wholesale on save.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Document {
    /// Creates a new, empty document with a fresh id.
    ///
    /// The title is trimmed; a title that is empty after trimming is rejected.
    pub fn new(title: &str) -> Result<Self> {
        let title = validate_title(title)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title,
            content: String::new(),
            created_at: now,
            modified_at: now,
        })
    }

    /// Returns the list-screen projection of this document.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            modified_at: self.modified_at,
        }
    }

    /// Computes the modification timestamp for the next save.
    ///
    /// Always strictly later than the current `modified_at`, even when the
    /// wall clock has not advanced (or went backwards) since the last save.
    pub fn next_modified_at(&self) -> DateTime<Utc> {
        let now = Utc::now();
        if now > self.modified_at {
            now
        } else {
            self.modified_at + Duration::microseconds(1)
        }
    }
}

/// Checks and normalizes a document title.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(FocusError::validation("Document title must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Canonical form of a document id: the lowercase hyphenated UUID.
///
/// Uppercase, braced, simple and URN spellings of the same UUID all map to
/// one id. Returns `None` for strings that are not UUIDs.
pub fn canonical_id(id: &str) -> Option<String> {
    Uuid::parse_str(id).ok().map(|uuid| uuid.to_string())
}

/// Metadata row of the document index shown on the list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub modified_at: DateTime<Utc>,
}

/// Sorts summaries newest-modified first. Ties are broken by id so the
/// order is deterministic.
pub fn sort_index(index: &mut [DocumentSummary]) {
    index.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = Document::new("  Draft  ").unwrap();
        assert_eq!(doc.title, "Draft");
        assert!(doc.content.is_empty());
        assert_eq!(doc.created_at, doc.modified_at);
        assert!(Uuid::parse_str(&doc.id).is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        assert!(Document::new("").unwrap_err().is_validation());
        assert!(Document::new("   \t").unwrap_err().is_validation());
    }

    #[test]
    fn test_next_modified_at_is_strictly_later() {
        let mut doc = Document::new("Draft").unwrap();
        // Pretend the last save happened in the future.
        doc.modified_at = Utc::now() + Duration::hours(1);
        let next = doc.next_modified_at();
        assert!(next > doc.modified_at);
    }

    #[test]
    fn test_sort_index_newest_first() {
        let now = Utc::now();
        let mut index = vec![
            DocumentSummary {
                id: "a".into(),
                title: "Old".into(),
                modified_at: now - Duration::minutes(5),
            },
            DocumentSummary {
                id: "b".into(),
                title: "New".into(),
                modified_at: now,
            },
        ];
        sort_index(&mut index);
        assert_eq!(index[0].title, "New");
        assert_eq!(index[1].title, "Old");
    }

    #[test]
    fn test_canonical_id() {
        let doc = Document::new("Draft").unwrap();
        assert_eq!(canonical_id(&doc.id), Some(doc.id.clone()));
        assert_eq!(canonical_id(&doc.id.to_uppercase()), Some(doc.id.clone()));
        assert_eq!(
            canonical_id(&format!("urn:uuid:{}", doc.id)),
            Some(doc.id.clone())
        );
        assert_eq!(canonical_id("../etc/passwd"), None);
    }
}
