//! Exit challenge domain module.

mod authenticator;

pub use authenticator::{AuthState, EXIT_SECRETS, ExitAuthenticator, SubmitResult};
