//! Outage alerting and the credential-gated tunnel reset.
//!
//! - [`alert`]: the [`AlertState`] machine deciding when the banner shows and
//!   when a reset may be started
//! - [`credential`]: scoped secret handling ([`Credential`], [`CredentialInput`])
//! - [`workflow`]: submission of the reset request and its [`ResetOutcome`]

pub mod alert;
pub mod credential;
pub mod workflow;

pub use alert::{AlertCommand, AlertController, AlertEvent, AlertState, Origin, RESET_COOLDOWN};
pub use credential::{Credential, CredentialInput};
pub use workflow::{ResetOutcome, ResetWorkflow, SubmitError};
