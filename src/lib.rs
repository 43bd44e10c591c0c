//! # tunnelwatch
//!
//! A terminal dashboard for a ping-monitor service that watches a handful of
//! VPN tunnels.
//!
//! The dashboard polls the service once per second, keeps the last minute of
//! latency per host, raises a banner when the service reports every tunnel
//! down, and lets the operator trigger a password-gated remote reset whose
//! SSH transcript is shown in the UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (tick)  │    │ (store)  │    │(render) │    │         │ │
//! │  └──┬───┬──┘    └──────────┘    └─────────┘    └─────────┘ │
//! │     │   │                                                   │
//! │     │   ▼                                                   │
//! │     │  ┌──────────┐                                         │
//! │     │  │ recovery │── alert state, credential, reset ──┐    │
//! │     │  └──────────┘                                    │    │
//! │     ▼                                                  ▼    │
//! │  ┌─────────┐                                   ┌──────────┐ │
//! │  │ source  │◀── Poller | FileSource | Channel   │MonitorApi│ │
//! │  └─────────┘                                   └──────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: application state; [`App::tick`] applies finished polls and
//!   resets once per frame
//! - **[`source`]**: the [`DataSource`] trait and the [`MonitorApi`] HTTP client
//! - **[`data`]**: bounded per-host history ([`MetricStore`]) and everything
//!   derived from it for display
//! - **[`recovery`]**: the [`AlertState`] machine and the credential-gated
//!   [`ResetWorkflow`]
//! - **[`ui`]**: terminal rendering using ratatui
//! - **[`config`]**: layered settings (file, environment, flags)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the monitor service on localhost:5000
//! tunnelwatch
//!
//! # Watch a remote service with a longer request timeout
//! tunnelwatch --endpoint http://monitor.lan:5000 --timeout 5s
//!
//! # Replay a captured snapshot
//! tunnelwatch --file ping_results.json
//! ```
//!
//! ### As a library polling the service
//!
//! ```no_run
//! use std::sync::Arc;
//! use tunnelwatch::{App, HostLabels, HttpApi, Poller};
//!
//! # tokio_test::block_on(async {
//! let api = Arc::new(HttpApi::builder().endpoint("http://monitor.lan:5000").build().unwrap());
//! let source = Poller::spawn(api.clone());
//! let app = App::new(Box::new(source), api, HostLabels::reference());
//! # });
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use std::sync::Arc;
//! use tunnelwatch::{App, ChannelSource, HostLabels, HttpApi};
//!
//! let (tx, source) = ChannelSource::create("in-process pinger");
//! let api = Arc::new(HttpApi::builder().build().unwrap());
//! let app = App::new(Box::new(source), api, HostLabels::reference());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod recovery;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{HostLabels, HostSeries, HostStatus, HostSummary, MetricStore, StatusBoard};
pub use recovery::{AlertController, AlertState, Credential, ResetOutcome, ResetWorkflow};
pub use source::{
    ApiError, ChannelSource, DataSource, FileSource, HttpApi, MonitorApi, Poller, Sample, Snapshot,
};
