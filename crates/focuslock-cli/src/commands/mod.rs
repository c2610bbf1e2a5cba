pub mod documents;
pub mod write;
