//! Session domain module.
//!
//! The stateful controller lives in `focuslock-application`; this module only
//! holds the types it hands out.

mod model;

pub use model::{ExitOutcome, SessionSnapshot};
