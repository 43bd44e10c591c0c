//! Application state and the per-frame update step.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::data::{HostLabels, HostStatus, MetricStore, StatusBoard};
use crate::recovery::{AlertCommand, AlertController, AlertEvent, AlertState, ResetWorkflow};
use crate::source::{DataSource, MonitorApi};
use crate::ui::Theme;

/// File written by the in-app export key.
pub const EXPORT_FILE: &str = "tunnelwatch_export.json";

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// One latency chart per host.
    Graph,
    /// Summary table and recent-history grid.
    Table,
}

impl View {
    /// Toggle between the two views.
    pub fn next(self) -> Self {
        match self {
            View::Graph => View::Table,
            View::Table => View::Graph,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Graph => "Graph",
            View::Table => "Table",
        }
    }
}

/// Main application state.
///
/// Async work (polls, reset requests) reports back through channels; [`App::tick`]
/// is the one place those results are applied.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    /// First host shown in the graph view.
    pub scroll: usize,

    // Data
    source: Option<Box<dyn DataSource>>,
    api: Arc<dyn MonitorApi>,
    pub labels: HostLabels,
    pub store: MetricStore,
    pub status: StatusBoard,

    // Recovery
    alert: AlertController,
    reset: ResetWorkflow,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App reading snapshots from `source` and sending recovery
    /// requests through `api`.
    pub fn new(source: Box<dyn DataSource>, api: Arc<dyn MonitorApi>, labels: HostLabels) -> Self {
        Self::with_theme(source, api, labels, Theme::auto_detect())
    }

    pub fn with_theme(
        source: Box<dyn DataSource>,
        api: Arc<dyn MonitorApi>,
        labels: HostLabels,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Graph,
            show_help: false,
            scroll: 0,
            source: Some(source),
            api,
            labels,
            store: MetricStore::new(),
            status: StatusBoard::new(),
            alert: AlertController::new(),
            reset: ResetWorkflow::new(),
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.as_ref().map_or("stopped", |s| s.description())
    }

    /// Error from the last failed poll, if the last poll failed.
    pub fn poll_error(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.error())
    }

    pub fn alert_state(&self) -> AlertState {
        self.alert.state()
    }

    /// Masked form of the credential being typed.
    pub fn masked_input(&self) -> String {
        self.reset.input().masked()
    }

    pub fn input_is_empty(&self) -> bool {
        self.reset.input().is_empty()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Apply everything that completed since the last frame.
    ///
    /// Order: the newest snapshot, then a finished reset, then the clock.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if let Some(snapshot) = self.source.as_mut().and_then(|s| s.poll()) {
            self.store.update(&snapshot, &self.labels);
            self.status.apply_snapshot(&snapshot, now);
            self.send(
                AlertEvent::Snapshot {
                    tunnels_down: snapshot.tunnels_down,
                },
                now,
            );
            self.scroll = self.scroll.min(self.store.len().saturating_sub(1));
        }

        if let Some(outcome) = self.reset.poll_outcome() {
            self.status.apply_reset(&outcome);
            self.send(
                AlertEvent::ResetResolved {
                    succeeded: outcome.succeeded,
                },
                now,
            );
        }

        self.send(AlertEvent::Tick, now);
    }

    fn send(&mut self, event: AlertEvent, now: Instant) -> Option<AlertCommand> {
        let command = self.alert.handle(event, now);
        if command == Some(AlertCommand::ClearTunnelDown) {
            self.clear_tunnel_down();
        }
        command
    }

    /// Fire-and-forget notification that the operator acknowledged the alert.
    fn clear_tunnel_down(&self) {
        let api = self.api.clone();
        tokio::spawn(async move {
            match api.clear_tunnel_down().await {
                Ok(ack) => debug!(%ack, "tunnels-down flag cleared"),
                Err(e) => warn!(error = %e, "failed to clear tunnels-down flag"),
            }
        });
    }

    /// "Recover Now" on the alert banner.
    pub fn recover_now(&mut self) {
        self.send(AlertEvent::RecoverNow, Instant::now());
        if self.alert.state().is_prompt_open() {
            self.reset.clear_input();
        }
    }

    /// "Dismiss" on the alert banner.
    pub fn dismiss_alert(&mut self) {
        self.send(AlertEvent::Dismiss, Instant::now());
    }

    /// Open the reset prompt without an alert.
    pub fn manual_reset(&mut self) {
        if self.alert.state().is_resetting() {
            self.set_status_message("Resetting...".to_string());
            return;
        }
        let was_open = self.alert.state().is_prompt_open();
        self.send(AlertEvent::ManualReset, Instant::now());
        if !was_open && self.alert.state().is_prompt_open() {
            self.reset.clear_input();
        }
    }

    pub fn prompt_push(&mut self, c: char) {
        if self.alert.state().is_prompt_open() {
            self.reset.input_mut().push(c);
        }
    }

    pub fn prompt_pop(&mut self) {
        self.reset.input_mut().pop();
    }

    pub fn cancel_prompt(&mut self) {
        self.reset.clear_input();
        self.send(AlertEvent::Cancel, Instant::now());
    }

    /// Submit the typed credential.
    ///
    /// A blank credential sends nothing and leaves the prompt open.
    pub fn submit_prompt(&mut self) {
        if !self.alert.state().is_prompt_open() {
            return;
        }

        let credential = match self.reset.take_credential() {
            Ok(credential) => credential,
            Err(e) => {
                self.set_status_message(e.to_string());
                return;
            }
        };

        if let Some(AlertCommand::SendReset { origin }) = self.send(AlertEvent::Submit, Instant::now()) {
            info!(origin = origin.as_str(), "submitting tunnel reset");
            self.status.begin_reset();
            self.reset.dispatch(self.api.clone(), credential, origin);
        }
    }

    /// Toggle between the graph and table views.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn scroll_down(&mut self) {
        let max = self.store.len().saturating_sub(1);
        self.scroll = (self.scroll + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_ssh_log(&mut self) {
        self.status.toggle_ssh_log();
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Stop polling and discard the typed credential.
    ///
    /// Requests already on the wire are left to finish; their results are
    /// never applied.
    pub fn shutdown(&mut self) {
        self.reset.clear_input();
        if self.source.take().is_some() {
            info!("polling stopped");
        }
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.store.is_empty() {
            anyhow::bail!("No data to export");
        }
        write_export(path, &self.store, &self.status)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// JSON export of the per-host summaries.
pub fn export_document(store: &MetricStore, status: &StatusBoard) -> serde_json::Value {
    let summaries = store.summaries();
    let up = summaries.iter().filter(|s| s.status == HostStatus::Up).count();

    json!({
        "summary": {
            "total_hosts": summaries.len(),
            "up": up,
            "down": summaries.len() - up,
            "auto_reset_status": status.auto_reset_status,
        },
        "hosts": summaries,
    })
}

pub fn write_export(path: &Path, store: &MetricStore, status: &StatusBoard) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_document(store, status))?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::sync::watch;

    use crate::recovery::{Origin, RESET_COOLDOWN};
    use crate::source::testing::FakeApi;
    use crate::source::{ApiError, ChannelSource, ResetResponse, Sample, Snapshot};

    fn app() -> (watch::Sender<Snapshot>, Arc<FakeApi>, App) {
        let (tx, source) = ChannelSource::create("test");
        let api = Arc::new(FakeApi::new());
        let app = App::with_theme(Box::new(source), api.clone(), HostLabels::reference(), Theme::dark());
        (tx, api, app)
    }

    fn down_snapshot() -> Snapshot {
        Snapshot {
            tunnels_down: true,
            ..Snapshot::default()
        }
    }

    fn typed(app: &mut App, s: &str) {
        s.chars().for_each(|c| app.prompt_push(c));
    }

    /// Tick until the in-flight reset has been applied.
    async fn settle_reset(app: &mut App) {
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.tick();
            if !app.reset.is_in_flight() {
                return;
            }
        }
        panic!("reset never resolved");
    }

    async fn settle_clear(api: &FakeApi) {
        for _ in 0..100 {
            if api.clear_calls() > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_snapshot_fills_table() {
        let (tx, _api, mut app) = app();
        let mut snapshot = Snapshot::default();
        snapshot.hosts.insert(
            "hostA".to_string(),
            vec![Sample::Reply(10.2), Sample::Timeout, Sample::Reply(9.8)],
        );
        tx.send(snapshot).unwrap();
        app.tick();

        let summaries = app.store.summaries();
        assert_eq!(summaries.len(), 1);
        let row = &summaries[0];
        assert_eq!(row.status, HostStatus::Up);
        assert_eq!(row.current_text(), "9.8");
        assert_eq!(row.loss_text(), "33%");
        assert_eq!(app.alert_state(), AlertState::Idle);
        assert!(app.status.last_refresh.is_some());
    }

    #[tokio::test]
    async fn test_tunnels_down_raises_alert_once() {
        let (tx, _api, mut app) = app();

        tx.send(down_snapshot()).unwrap();
        app.tick();
        assert_eq!(app.alert_state(), AlertState::TunnelsDown);

        tx.send(down_snapshot()).unwrap();
        app.tick();
        assert_eq!(app.alert_state(), AlertState::TunnelsDown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_reset_succeeds_after_cooldown() {
        let (tx, api, mut app) = app();
        tx.send(down_snapshot()).unwrap();
        app.tick();

        app.recover_now();
        assert_eq!(app.alert_state().origin(), Some(Origin::Auto));
        typed(&mut app, "x");
        app.submit_prompt();

        assert!(app.input_is_empty());
        assert!(app.alert_state().is_resetting());
        assert_eq!(app.status.ssh_log, vec!["Starting VPN reset process..."]);
        assert!(app.status.show_ssh_log);

        settle_reset(&mut app).await;
        assert_eq!(api.passwords(), vec!["x".to_string()]);
        assert_eq!(app.status.auto_reset_status, "Reset complete");
        assert!(app.alert_state().is_resetting());

        tokio::time::advance(RESET_COOLDOWN).await;
        app.tick();
        assert_eq!(app.alert_state(), AlertState::Idle);
    }

    #[tokio::test]
    async fn test_empty_credential_sends_nothing() {
        let (_tx, api, mut app) = app();
        app.manual_reset();
        app.submit_prompt();

        assert!(app.alert_state().is_prompt_open());
        assert_eq!(app.get_status_message(), Some("Password required"));
        assert!(!app.reset.is_in_flight());
        assert!(api.passwords().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_auto_reset_returns_to_alert() {
        let (tx, api, mut app) = app();
        api.script_reset(Err(ApiError::Status(500)));
        tx.send(down_snapshot()).unwrap();
        app.tick();

        app.recover_now();
        typed(&mut app, "pw");
        app.submit_prompt();
        settle_reset(&mut app).await;

        assert_eq!(app.status.auto_reset_status, "Reset failed");
        assert_eq!(
            app.status.ssh_log.last().map(String::as_str),
            Some("Error: Failed to connect to server")
        );

        tokio::time::advance(RESET_COOLDOWN).await;
        app.tick();
        assert_eq!(app.alert_state(), AlertState::TunnelsDown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_reset_shows_service_message() {
        let (_tx, api, mut app) = app();
        api.script_reset(Err(ApiError::Rejected {
            status: 401,
            response: ResetResponse {
                message: "Invalid password".into(),
                output: None,
            },
        }));

        app.manual_reset();
        typed(&mut app, "wrong");
        app.submit_prompt();
        settle_reset(&mut app).await;

        assert_eq!(app.status.auto_reset_status, "Invalid password");
        assert!(!app
            .status
            .ssh_log
            .iter()
            .any(|line| line == "Error: Failed to connect to server"));

        tokio::time::advance(RESET_COOLDOWN).await;
        app.tick();
        assert_eq!(app.alert_state(), AlertState::Idle);
    }

    #[tokio::test]
    async fn test_dismiss_issues_one_clear_call() {
        let (tx, api, mut app) = app();
        tx.send(down_snapshot()).unwrap();
        app.tick();

        app.dismiss_alert();
        app.dismiss_alert();
        assert_eq!(app.alert_state(), AlertState::Idle);

        settle_clear(&api).await;
        tokio::task::yield_now().await;
        assert_eq!(api.clear_calls(), 1);
    }

    #[tokio::test]
    async fn test_snapshots_do_not_interrupt_prompt() {
        let (tx, _api, mut app) = app();
        app.manual_reset();
        tx.send(down_snapshot()).unwrap();
        app.tick();

        assert!(app.alert_state().is_prompt_open());
        app.manual_reset();
        assert!(app.alert_state().is_prompt_open());
    }

    #[tokio::test]
    async fn test_credential_wiped_on_cancel_and_shutdown() {
        let (_tx, _api, mut app) = app();
        app.manual_reset();
        typed(&mut app, "secret");
        assert_eq!(app.masked_input(), "******");

        app.cancel_prompt();
        assert!(app.input_is_empty());
        assert_eq!(app.alert_state(), AlertState::Idle);

        app.manual_reset();
        typed(&mut app, "secret");
        app.shutdown();
        assert!(app.input_is_empty());
        assert!(!app.running);
        assert_eq!(app.source_description(), "stopped");
    }

    #[tokio::test]
    async fn test_keystrokes_ignored_without_prompt() {
        let (_tx, _api, mut app) = app();
        typed(&mut app, "abc");
        assert!(app.input_is_empty());
    }

    #[tokio::test]
    async fn test_view_toggle_and_scroll() {
        let (tx, _api, mut app) = app();
        let mut snapshot = Snapshot::default();
        for host in ["a", "b", "c"] {
            snapshot.hosts.insert(host.to_string(), vec![Sample::Reply(1.0)]);
        }
        tx.send(snapshot).unwrap();
        app.tick();

        assert_eq!(app.current_view, View::Graph);
        app.next_view();
        assert_eq!(app.current_view, View::Table);
        app.next_view();
        assert_eq!(app.current_view, View::Graph);

        for _ in 0..5 {
            app.scroll_down();
        }
        assert_eq!(app.scroll, 2);
        app.scroll_up();
        assert_eq!(app.scroll, 1);
    }

    #[tokio::test]
    async fn test_export_state() {
        let (tx, _api, mut app) = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        assert!(app.export_state(&path).is_err());

        let mut snapshot = Snapshot::default();
        snapshot.hosts.insert("172.20.3.108".to_string(), vec![Sample::Reply(2.0)]);
        snapshot.hosts.insert("172.20.2.201".to_string(), vec![Sample::Timeout]);
        tx.send(snapshot).unwrap();
        app.tick();
        app.export_state(&path).unwrap();

        let exported: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported["summary"]["total_hosts"], 2);
        assert_eq!(exported["summary"]["up"], 1);
        assert_eq!(exported["summary"]["auto_reset_status"], "Idle");
        assert_eq!(exported["hosts"][1]["label"], "Curator Service - 172.20.3.108");
    }
}
