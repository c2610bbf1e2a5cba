//! Network isolation capability.

use std::time::Duration;

/// Binary on/off control of the machine's network access.
///
/// Calls are fire-and-forget commands: implementations report their own
/// failures through logging and never block the caller on completion.
/// Commands take effect in the order they were issued.
pub trait NetworkGate: Send + Sync {
    fn disable(&self);

    fn enable(&self);

    /// Blocks until every command issued so far has finished, or until
    /// `timeout` elapses. Returns `false` on timeout.
    ///
    /// Processes call this before exiting so a queued `enable` is not lost.
    fn settle(&self, _timeout: Duration) -> bool {
        true
    }
}
