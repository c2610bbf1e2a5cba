//! Domain layer for focuslock.
//!
//! Holds the document model, the staged exit authenticator, session
//! projections and the traits the outer layers implement. Nothing in this
//! crate touches the file system or the network.

pub mod config;
pub mod document;
pub mod error;
pub mod exit;
pub mod network;
pub mod session;

// Re-export common error type
pub use error::FocusError;
