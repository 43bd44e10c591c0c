//! Outage alert and recovery-prompt state machine.
//!
//! ```text
//!            snapshot(down)             recover now
//!   Idle ──────────────────▶ TunnelsDown ────────────▶ RecoveryPromptOpen(auto)
//!    ▲ │◀────── dismiss ───────┘  │ manual                 │        │
//!    │ │ manual                   ▼                        │ cancel │ submit
//!    │ └────────────────▶ RecoveryPromptOpen(manual) ──────┤        ▼
//!    │                                                     │  ResetInProgress
//!    └─────────────────────────────────────────────────────┘        │
//!    ◀──────────────── resolved + cool-down elapsed ────────────────┘
//! ```
//!
//! Transitions are computed by [`AlertState::on`], a pure function of the
//! current state, the event and the current time.

use std::mem::discriminant;

use tokio::time::{Duration, Instant};
use tracing::info;

/// Minimum time the reset affordance stays busy after a submission.
pub const RESET_COOLDOWN: Duration = Duration::from_secs(5);

/// What opened the recovery prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The operator asked for a reset on their own.
    Manual,
    /// The operator answered the tunnels-down alert.
    Auto,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Manual => "manual",
            Origin::Auto => "auto",
        }
    }
}

/// The single alert/recovery state of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertState {
    /// Nothing to report.
    #[default]
    Idle,
    /// The service reported every tunnel down; the banner is showing.
    TunnelsDown,
    /// The credential prompt is open.
    RecoveryPromptOpen {
        origin: Origin,
        /// Whether the down-alert was showing when the prompt opened.
        alert_raised: bool,
    },
    /// A reset request has been submitted.
    ResetInProgress {
        origin: Origin,
        alert_raised: bool,
        submitted_at: Instant,
        /// `Some(succeeded)` once the request has resolved.
        outcome: Option<bool>,
    },
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEvent {
    /// A poll cycle delivered a snapshot.
    Snapshot { tunnels_down: bool },
    /// "Recover Now" on the alert banner.
    RecoverNow,
    /// "Dismiss" on the alert banner.
    Dismiss,
    /// The operator triggered a reset manually.
    ManualReset,
    /// The prompt was cancelled.
    Cancel,
    /// A non-empty credential was submitted.
    Submit,
    /// The reset request finished.
    ResetResolved { succeeded: bool },
    /// Periodic clock tick.
    Tick,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCommand {
    /// Tell the service to clear its tunnels-down flag (fire-and-forget).
    ClearTunnelDown,
    /// Send the reset request.
    SendReset { origin: Origin },
}

impl AlertState {
    /// Compute the next state for `event` at time `now`.
    pub fn on(self, event: AlertEvent, now: Instant) -> (AlertState, Option<AlertCommand>) {
        use AlertEvent as E;
        use AlertState as S;

        match (self, event) {
            (S::Idle, E::Snapshot { tunnels_down: true }) => (S::TunnelsDown, None),

            (S::TunnelsDown, E::RecoverNow) => (
                S::RecoveryPromptOpen {
                    origin: Origin::Auto,
                    alert_raised: true,
                },
                None,
            ),
            (S::TunnelsDown, E::Dismiss) => (S::Idle, Some(AlertCommand::ClearTunnelDown)),

            (S::Idle, E::ManualReset) => (
                S::RecoveryPromptOpen {
                    origin: Origin::Manual,
                    alert_raised: false,
                },
                None,
            ),
            (S::TunnelsDown, E::ManualReset) => (
                S::RecoveryPromptOpen {
                    origin: Origin::Manual,
                    alert_raised: true,
                },
                None,
            ),

            (S::RecoveryPromptOpen { origin, alert_raised }, E::Cancel) => {
                let next = match origin {
                    Origin::Auto => S::Idle,
                    Origin::Manual if alert_raised => S::TunnelsDown,
                    Origin::Manual => S::Idle,
                };
                (next, None)
            }
            (S::RecoveryPromptOpen { origin, alert_raised }, E::Submit) => (
                S::ResetInProgress {
                    origin,
                    alert_raised,
                    submitted_at: now,
                    outcome: None,
                },
                Some(AlertCommand::SendReset { origin }),
            ),

            (
                S::ResetInProgress {
                    origin,
                    alert_raised,
                    submitted_at,
                    outcome: None,
                },
                E::ResetResolved { succeeded },
            ) => (
                S::ResetInProgress {
                    origin,
                    alert_raised,
                    submitted_at,
                    outcome: Some(succeeded),
                }
                .settle(now),
                None,
            ),
            (state @ S::ResetInProgress { .. }, E::Tick) => (state.settle(now), None),

            (state, _) => (state, None),
        }
    }

    /// Leave `ResetInProgress` once the request has resolved and the
    /// cool-down has run out.
    fn settle(self, now: Instant) -> AlertState {
        match self {
            AlertState::ResetInProgress {
                alert_raised,
                submitted_at,
                outcome: Some(succeeded),
                ..
            } if now.duration_since(submitted_at) >= RESET_COOLDOWN => {
                if !succeeded && alert_raised {
                    AlertState::TunnelsDown
                } else {
                    AlertState::Idle
                }
            }
            state => state,
        }
    }

    /// The tunnels-down banner is visible.
    pub fn alert_visible(&self) -> bool {
        matches!(self, AlertState::TunnelsDown)
    }

    pub fn is_prompt_open(&self) -> bool {
        matches!(self, AlertState::RecoveryPromptOpen { .. })
    }

    pub fn is_resetting(&self) -> bool {
        matches!(self, AlertState::ResetInProgress { .. })
    }

    /// Origin of the open prompt or running reset.
    pub fn origin(&self) -> Option<Origin> {
        match self {
            AlertState::RecoveryPromptOpen { origin, .. }
            | AlertState::ResetInProgress { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertState::Idle => "idle",
            AlertState::TunnelsDown => "tunnels-down",
            AlertState::RecoveryPromptOpen { .. } => "prompt-open",
            AlertState::ResetInProgress { .. } => "resetting",
        }
    }
}

/// Owner of the [`AlertState`].
#[derive(Debug, Default)]
pub struct AlertController {
    state: AlertState,
}

impl AlertController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Apply an event, returning any side effect the caller must perform.
    pub fn handle(&mut self, event: AlertEvent, now: Instant) -> Option<AlertCommand> {
        let (next, command) = self.state.on(event, now);
        if discriminant(&next) != discriminant(&self.state) {
            info!(from = self.state.label(), to = next.label(), ?event, "alert state changed");
        }
        self.state = next;
        command
    }
}
