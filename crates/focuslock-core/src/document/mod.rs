//! Document domain module.
//!
//! # Module Structure
//!
//! - `model`: `Document` and the `DocumentSummary` index row
//! - `repository`: `DocumentRepository` trait for persistence

mod model;
pub mod repository;

pub use model::{Document, DocumentSummary, canonical_id, sort_index, validate_title};
pub use repository::DocumentRepository;
