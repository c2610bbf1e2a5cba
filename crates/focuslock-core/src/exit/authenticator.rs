//! Staged passphrase gate guarding the exit transition.

use serde::{Deserialize, Serialize};

use crate::error::{FocusError, Result};

/// The ordered secrets that release a writing session.
///
/// These are fixed at build time and are not meant to resist inspection of
/// the binary.
pub const EXIT_SECRETS: [&str; 3] = ["focus", "create", "freedom"];

/// Current position of the authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    /// Waiting for the secret at this index.
    Locked(usize),
    /// Every secret was supplied in order.
    Unlocked,
}

/// Result of a single `submit` call.
///
/// The submitted candidate is never echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub accepted: bool,
    pub unlocked: bool,
}

/// Sequential multi-stage passphrase state machine.
///
/// Starts in `Locked(0)`. A correct secret advances one stage, a wrong one
/// leaves the stage as it is. Only `reset` ever moves the stage backwards.
#[derive(Debug, Clone)]
pub struct ExitAuthenticator {
    secrets: Vec<String>,
    state: AuthState,
}

impl Default for ExitAuthenticator {
    fn default() -> Self {
        Self {
            secrets: EXIT_SECRETS.iter().map(|s| s.to_string()).collect(),
            state: AuthState::Locked(0),
        }
    }
}

impl ExitAuthenticator {
    /// Creates an authenticator over the built-in `EXIT_SECRETS`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an authenticator over a custom secret sequence.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Validation` if the sequence is empty or contains
    /// an empty secret.
    pub fn with_secrets<I, S>(secrets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let secrets: Vec<String> = secrets.into_iter().map(Into::into).collect();
        if secrets.is_empty() {
            return Err(FocusError::validation("At least one exit secret is required"));
        }
        if secrets.iter().any(|s| s.is_empty()) {
            return Err(FocusError::validation("Exit secrets must not be empty"));
        }
        Ok(Self {
            secrets,
            state: AuthState::Locked(0),
        })
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Number of secrets already accepted. Equals `stage_count()` once unlocked.
    pub fn stage(&self) -> usize {
        match self.state {
            AuthState::Locked(stage) => stage,
            AuthState::Unlocked => self.secrets.len(),
        }
    }

    pub fn stage_count(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == AuthState::Unlocked
    }

    /// Returns to `Locked(0)` from any state.
    pub fn reset(&mut self) {
        self.state = AuthState::Locked(0);
    }

    /// Checks `candidate` against the secret for the current stage.
    ///
    /// Comparison is exact and case-sensitive.
    pub fn submit(&mut self, candidate: &str) -> SubmitResult {
        let stage = match self.state {
            AuthState::Unlocked => {
                return SubmitResult {
                    accepted: true,
                    unlocked: true,
                };
            }
            AuthState::Locked(stage) => stage,
        };

        if candidate != self.secrets[stage] {
            return SubmitResult {
                accepted: false,
                unlocked: false,
            };
        }

        if stage + 1 == self.secrets.len() {
            self.state = AuthState::Unlocked;
            SubmitResult {
                accepted: true,
                unlocked: true,
            }
        } else {
            self.state = AuthState::Locked(stage + 1);
            SubmitResult {
                accepted: true,
                unlocked: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_secret_advances_stage() {
        let mut auth = ExitAuthenticator::new();
        let result = auth.submit("focus");
        assert_eq!(
            result,
            SubmitResult {
                accepted: true,
                unlocked: false
            }
        );
        assert_eq!(auth.state(), AuthState::Locked(1));
    }

    #[test]
    fn test_wrong_secret_keeps_stage() {
        let mut auth = ExitAuthenticator::new();
        let result = auth.submit("Focus");
        assert_eq!(
            result,
            SubmitResult {
                accepted: false,
                unlocked: false
            }
        );
        assert_eq!(auth.stage(), 0);

        auth.submit("focus");
        auth.submit("freedom"); // right secret, wrong stage
        assert_eq!(auth.state(), AuthState::Locked(1));
    }

    #[test]
    fn test_full_sequence_unlocks() {
        let mut auth = ExitAuthenticator::new();
        assert!(!auth.submit("focus").unlocked);
        assert!(!auth.submit("create").unlocked);
        let last = auth.submit("freedom");
        assert!(last.accepted && last.unlocked);
        assert!(auth.is_unlocked());
        assert_eq!(auth.stage(), 3);
    }

    #[test]
    fn test_submit_when_unlocked_is_noop() {
        let mut auth = ExitAuthenticator::with_secrets(["one"]).unwrap();
        assert!(auth.submit("one").unlocked);
        let again = auth.submit("anything");
        assert!(again.accepted && again.unlocked);
        assert!(auth.is_unlocked());
    }

    #[test]
    fn test_reset_from_unlocked() {
        let mut auth = ExitAuthenticator::new();
        for secret in EXIT_SECRETS {
            auth.submit(secret);
        }
        assert!(auth.is_unlocked());
        auth.reset();
        assert_eq!(auth.state(), AuthState::Locked(0));
    }

    #[test]
    fn test_invalid_secret_lists() {
        assert!(ExitAuthenticator::with_secrets(Vec::<String>::new()).is_err());
        assert!(ExitAuthenticator::with_secrets(["a", ""]).is_err());
    }
}
