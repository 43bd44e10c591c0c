//! Credential capture and dispatch of the remote tunnel reset.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{info, warn};

use super::alert::Origin;
use super::credential::{Credential, CredentialInput};
use crate::source::{ApiError, MonitorApi, ResetResponse};

/// First transcript line shown while a reset request is on the wire.
pub const STARTING_LINE: &str = "Starting VPN reset process...";
/// Status shown when the reset request got no usable answer.
pub const FAILURE_STATUS: &str = "Reset failed";
/// Transcript line appended when the reset request got no usable answer.
pub const FAILURE_LINE: &str = "Error: Failed to connect to server";
/// Status used when the service answered without a message.
const DEFAULT_SUCCESS_STATUS: &str = "VPN reset triggered";

/// Reasons a submission is refused before anything is sent.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Password required")]
    EmptyCredential,
    #[error("A reset is already running")]
    AlreadyRunning,
}

/// Structured result of one reset request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetOutcome {
    pub origin: Origin,
    /// Replaces the auto-reset status text.
    pub status: String,
    /// Replaces the SSH log when present.
    pub transcript: Option<Vec<String>>,
    pub succeeded: bool,
    /// False when `status` is the local failure text rather than the
    /// service's own message.
    pub answered: bool,
}

impl ResetOutcome {
    pub fn from_response(origin: Origin, response: Result<ResetResponse, ApiError>) -> Self {
        match response {
            Ok(response) => {
                let status = if response.message.is_empty() {
                    DEFAULT_SUCCESS_STATUS.to_string()
                } else {
                    response.message
                };
                Self {
                    origin,
                    status,
                    transcript: response.output,
                    succeeded: true,
                    answered: true,
                }
            }
            Err(ApiError::Rejected { response, .. }) => {
                let status = if response.message.is_empty() {
                    FAILURE_STATUS.to_string()
                } else {
                    response.message
                };
                Self {
                    origin,
                    status,
                    transcript: response.output,
                    succeeded: false,
                    answered: true,
                }
            }
            Err(_) => Self::failed(origin),
        }
    }

    /// Outcome for a request that never produced a readable reply.
    pub fn failed(origin: Origin) -> Self {
        Self {
            origin,
            status: FAILURE_STATUS.to_string(),
            transcript: None,
            succeeded: false,
            answered: false,
        }
    }
}

/// Owns the credential prompt buffer and the in-flight reset request.
#[derive(Debug, Default)]
pub struct ResetWorkflow {
    input: CredentialInput,
    pending: Option<(Origin, oneshot::Receiver<ResetOutcome>)>,
}

impl ResetWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &CredentialInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut CredentialInput {
        &mut self.input
    }

    /// Take the typed credential for submission.
    ///
    /// On success the prompt buffer is already empty. A blank buffer is
    /// refused and left as typed.
    pub fn take_credential(&mut self) -> Result<Credential, SubmitError> {
        if self.pending.is_some() {
            return Err(SubmitError::AlreadyRunning);
        }
        self.input.take().ok_or(SubmitError::EmptyCredential)
    }

    /// Send the reset request on the current tokio runtime.
    pub fn dispatch(&mut self, api: Arc<dyn MonitorApi>, credential: Credential, origin: Origin) {
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let response = api.reset_vpn(credential).await;
            match &response {
                Ok(r) => info!(origin = origin.as_str(), status = %r.message, "reset request answered"),
                Err(e) => warn!(origin = origin.as_str(), error = %e, "reset request failed"),
            }
            let _ = tx.send(ResetOutcome::from_response(origin, response));
        });

        self.pending = Some((origin, rx));
    }

    /// Non-blocking check for a finished reset request.
    pub fn poll_outcome(&mut self) -> Option<ResetOutcome> {
        let (origin, receiver) = self.pending.as_mut()?;
        let outcome = match receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => {
                warn!("reset task ended without reporting a result");
                ResetOutcome::failed(*origin)
            }
        };
        self.pending = None;
        Some(outcome)
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Discard the typed credential (prompt opened, cancelled or torn down).
    pub fn clear_input(&mut self) {
        self.input.wipe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::FakeApi;

    fn typed(workflow: &mut ResetWorkflow, s: &str) {
        s.chars().for_each(|c| workflow.input_mut().push(c));
    }

    async fn wait_for_outcome(workflow: &mut ResetWorkflow) -> ResetOutcome {
        loop {
            if let Some(outcome) = workflow.poll_outcome() {
                return outcome;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }

    #[test]
    fn test_empty_credential_rejected() {
        let mut workflow = ResetWorkflow::new();
        assert_eq!(workflow.take_credential().unwrap_err(), SubmitError::EmptyCredential);

        typed(&mut workflow, " \t");
        assert_eq!(workflow.take_credential().unwrap_err(), SubmitError::EmptyCredential);
    }

    #[tokio::test]
    async fn test_submit_sends_password_and_clears_input() {
        let api = Arc::new(FakeApi::new());
        let mut workflow = ResetWorkflow::new();
        typed(&mut workflow, "x");

        let credential = workflow.take_credential().unwrap();
        assert!(workflow.input().is_empty());

        workflow.dispatch(api.clone(), credential, Origin::Auto);
        assert!(workflow.is_in_flight());
        assert_eq!(workflow.take_credential().unwrap_err(), SubmitError::AlreadyRunning);

        let outcome = wait_for_outcome(&mut workflow).await;
        assert!(outcome.succeeded);
        assert_eq!(outcome.status, "Reset complete");
        assert_eq!(api.passwords(), vec!["x".to_string()]);
        assert!(!workflow.is_in_flight());
    }

    #[tokio::test]
    async fn test_failed_request_yields_synthetic_status() {
        let api = Arc::new(FakeApi::new());
        api.script_reset(Err(ApiError::Connection("refused".into())));
        let mut workflow = ResetWorkflow::new();
        typed(&mut workflow, "pw");

        let credential = workflow.take_credential().unwrap();
        workflow.dispatch(api, credential, Origin::Manual);

        let outcome = wait_for_outcome(&mut workflow).await;
        assert!(!outcome.succeeded);
        assert_eq!(outcome.status, FAILURE_STATUS);
        assert_eq!(outcome.origin, Origin::Manual);
    }

    #[test]
    fn test_outcome_from_response() {
        let outcome = ResetOutcome::from_response(
            Origin::Auto,
            Ok(ResetResponse {
                message: String::new(),
                output: Some(vec!["line".into()]),
            }),
        );
        assert_eq!(outcome.status, DEFAULT_SUCCESS_STATUS);
        assert_eq!(outcome.transcript, Some(vec!["line".to_string()]));
    }

    #[test]
    fn test_rejected_reset_keeps_service_message() {
        let outcome = ResetOutcome::from_response(
            Origin::Auto,
            Err(ApiError::Rejected {
                status: 401,
                response: ResetResponse {
                    message: "Invalid password".into(),
                    output: Some(vec!["auth failed".into()]),
                },
            }),
        );
        assert!(!outcome.succeeded);
        assert!(outcome.answered);
        assert_eq!(outcome.status, "Invalid password");
        assert_eq!(outcome.transcript, Some(vec!["auth failed".to_string()]));

        let outcome = ResetOutcome::from_response(
            Origin::Manual,
            Err(ApiError::Rejected {
                status: 500,
                response: ResetResponse::default(),
            }),
        );
        assert_eq!(outcome.status, FAILURE_STATUS);
        assert!(outcome.transcript.is_none());

        let outcome = ResetOutcome::from_response(Origin::Manual, Err(ApiError::Status(502)));
        assert!(!outcome.answered);
        assert_eq!(outcome.status, FAILURE_STATUS);
    }

    #[test]
    fn test_clear_input() {
        let mut workflow = ResetWorkflow::new();
        typed(&mut workflow, "secret");
        workflow.clear_input();
        assert!(workflow.input().is_empty());
    }
}
