//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs are the versioned on-disk schema. They stay private to the
//! infrastructure layer so the domain types can evolve independently.
//!
//! ### DocumentRecord Version History
//! - **1.0.0**: Initial schema (`id`, `title`, `content`, RFC 3339 timestamps)

mod document;

pub use document::{DOCUMENT_SCHEMA_VERSION, DocumentRecord};
