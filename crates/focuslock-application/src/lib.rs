//! Application layer for focuslock.
//!
//! Coordinates the domain types with the repository and network gate
//! implementations: debounced autosave and the session controller that gates
//! exit behind the passphrase challenge.

pub mod autosave;
pub mod session;

#[cfg(test)]
mod test_support;

pub use autosave::{AutosaveEngine, AutosaveEvent};
pub use session::SessionController;
