//! Latency history and everything derived from it for display.
//!
//! ## Submodules
//!
//! - [`store`]: bounded per-host history ([`MetricStore`], [`HostSeries`])
//! - [`stats`]: table summaries ([`HostSummary`]) and the recent-history grid
//! - [`chart`]: fixed-width chart series for the graph view
//! - [`status`]: auto-reset status and SSH transcript ([`StatusBoard`])
//! - [`labels`]: host id to display label mapping
//! - [`duration`]: parsing and formatting of duration strings (e.g., "3s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot (raw JSON)
//!        │
//!        ▼
//! MetricStore::update()  ──▶ HostSeries (≤ 60 samples each)
//!        │
//!        ├──▶ HostSummary / HistoryGrid  (table view)
//!        │
//!        └──▶ ChartSeries                (graph view)
//! ```

pub mod chart;
pub mod duration;
pub mod labels;
pub mod stats;
pub mod status;
pub mod store;

pub use chart::{ChartPoint, ChartSeries, PointStatus, CHART_WINDOW};
pub use labels::HostLabels;
pub use stats::{GridRow, HistoryGrid, HostStatus, HostSummary, GRID_ROWS, SUMMARY_WINDOW};
pub use status::StatusBoard;
pub use store::{HostSeries, MetricStore, SERIES_CAPACITY};
