//! Service status and SSH transcript shown alongside the charts.

use tokio::time::Instant;

use crate::recovery::workflow::{FAILURE_LINE, STARTING_LINE};
use crate::recovery::ResetOutcome;
use crate::source::Snapshot;

const INITIAL_STATUS: &str = "Idle";

/// Status text and reset transcript, fed by both polls and reset results.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    pub auto_reset_status: String,
    pub ssh_log: Vec<String>,
    pub show_ssh_log: bool,
    /// When the last snapshot was applied.
    pub last_refresh: Option<Instant>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            auto_reset_status: INITIAL_STATUS.to_string(),
            ssh_log: Vec::new(),
            show_ssh_log: false,
            last_refresh: None,
        }
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absent or empty fields keep the previous values.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot, now: Instant) {
        if let Some(status) = snapshot.auto_reset_status.as_deref().filter(|s| !s.is_empty()) {
            self.auto_reset_status = status.to_string();
        }
        if let Some(output) = &snapshot.ssh_output {
            self.ssh_log = output.clone();
        }
        self.last_refresh = Some(now);
    }

    /// A reset request went out.
    pub fn begin_reset(&mut self) {
        self.ssh_log = vec![STARTING_LINE.to_string()];
        self.show_ssh_log = true;
    }

    pub fn apply_reset(&mut self, outcome: &ResetOutcome) {
        self.auto_reset_status = outcome.status.clone();
        if let Some(transcript) = &outcome.transcript {
            self.ssh_log = transcript.clone();
        }
        if !outcome.answered {
            self.ssh_log.push(FAILURE_LINE.to_string());
        }
    }

    pub fn toggle_ssh_log(&mut self) {
        self.show_ssh_log = !self.show_ssh_log;
    }

    /// Whether the service is reporting reset activity, highlighted in the
    /// status bar.
    pub fn is_reset_status(&self) -> bool {
        self.auto_reset_status.contains("Reset")
    }
}
