//! Per-host summary statistics for the table view.

use serde::Serialize;

use super::store::HostSeries;
use crate::source::Sample;

/// Number of newest samples the table summary is computed over.
pub const SUMMARY_WINDOW: usize = 10;

/// Number of rows in the recent-history grid (one per second).
pub const GRID_ROWS: usize = 20;

/// Reachability of a host, judged by its latest sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HostStatus {
    Up,
    Down,
}

impl HostStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HostStatus::Up => "UP",
            HostStatus::Down => "DOWN",
        }
    }
}

/// Summary of a host's most recent [`SUMMARY_WINDOW`] samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostSummary {
    pub host_id: String,
    pub label: String,
    pub status: HostStatus,
    /// Latest sample, `None` for a timeout or an empty series.
    pub current: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    /// Share of the window that timed out, rounded to a whole percent.
    pub loss_percent: u8,
    /// The window itself, oldest first.
    #[serde(skip)]
    pub recent: Vec<Sample>,
    pub stale: bool,
}

impl HostSummary {
    pub fn from_series(series: &HostSeries) -> Self {
        let recent: Vec<Sample> = series.window(SUMMARY_WINDOW).collect();
        let replies: Vec<f64> = recent.iter().filter_map(Sample::latency).collect();

        let status = match series.latest() {
            Some(Sample::Reply(_)) => HostStatus::Up,
            _ => HostStatus::Down,
        };

        let (min, max, avg) = if replies.is_empty() {
            (None, None, None)
        } else {
            let min = replies.iter().copied().fold(f64::INFINITY, f64::min);
            let max = replies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = replies.iter().sum::<f64>() / replies.len() as f64;
            (Some(min), Some(max), Some(avg))
        };

        Self {
            host_id: series.host_id.clone(),
            label: series.label.clone(),
            status,
            current: series.latest().and_then(|s| s.latency()),
            min,
            max,
            avg,
            loss_percent: loss_percent(recent.len(), replies.len()),
            recent,
            stale: series.stale,
        }
    }

    pub fn current_text(&self) -> String {
        self.current.map_or_else(|| "Timeout".to_string(), |v| format!("{:.1}", v))
    }

    pub fn min_text(&self) -> String {
        format_stat(self.min)
    }

    pub fn max_text(&self) -> String {
        format_stat(self.max)
    }

    pub fn avg_text(&self) -> String {
        format_stat(self.avg)
    }

    pub fn loss_text(&self) -> String {
        format!("{}%", self.loss_percent)
    }
}

fn format_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.1}", v))
}

/// An empty window counts as total loss.
fn loss_percent(window_len: usize, replies: usize) -> u8 {
    if window_len == 0 {
        return 100;
    }
    let lost = window_len.saturating_sub(replies) as f64;
    (lost / window_len as f64 * 100.0).round().clamp(0.0, 100.0) as u8
}

/// One grid row: every host's sample at the same offset.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub seconds_ago: usize,
    pub cells: Vec<Sample>,
}

impl GridRow {
    pub fn label(&self) -> String {
        format!("{}s ago", self.seconds_ago)
    }
}

/// Recent history of all hosts side by side, oldest row first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryGrid {
    /// Column headers (host labels).
    pub columns: Vec<String>,
    pub rows: Vec<GridRow>,
}

impl HistoryGrid {
    /// Missing history shows as a timeout.
    pub fn from_series<'a>(series: impl Iterator<Item = &'a HostSeries>) -> Self {
        let series: Vec<&HostSeries> = series.collect();
        let columns = series.iter().map(|s| s.label.clone()).collect();
        let rows = (0..GRID_ROWS)
            .rev()
            .map(|seconds_ago| GridRow {
                seconds_ago,
                cells: series
                    .iter()
                    .map(|s| s.sample_ago(seconds_ago).unwrap_or(Sample::Timeout))
                    .collect(),
            })
            .collect();
        Self { columns, rows }
    }
}
