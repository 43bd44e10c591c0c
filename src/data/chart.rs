//! Fixed-width chart series for the graph view.

use super::store::HostSeries;
use crate::source::Sample;

/// Points per chart, one per second.
pub const CHART_WINDOW: usize = 60;

/// Upper bound of the latency axis in milliseconds.
pub const Y_MAX: f64 = 12.5;

/// Spacing between latency axis labels.
pub const Y_STEP: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    Success,
    Timeout,
}

/// A single chart point.
///
/// Timeouts sit at `value == 0.0`; only `status` tells them apart from a
/// genuine 0 ms reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    /// Offset from the newest sample, `-59..=0`.
    pub seconds_ago: i32,
    pub value: f64,
    pub status: PointStatus,
}

impl ChartPoint {
    fn from_sample(seconds_ago: i32, sample: Sample) -> Self {
        match sample {
            Sample::Reply(ms) => Self {
                seconds_ago,
                value: ms,
                status: PointStatus::Success,
            },
            Sample::Timeout => Self {
                seconds_ago,
                value: 0.0,
                status: PointStatus::Timeout,
            },
        }
    }

    pub fn describe(&self) -> String {
        match self.status {
            PointStatus::Success => format!("{:.1} ms", self.value),
            PointStatus::Timeout => "Timeout".to_string(),
        }
    }
}

/// One host's chart: exactly [`CHART_WINDOW`] points, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
    /// Missing from the latest snapshot.
    pub stale: bool,
}

impl ChartSeries {
    /// Right-aligns the history so the newest sample sits at offset 0; older
    /// slots with no history are padded as timeouts.
    pub fn from_series(series: &HostSeries) -> Self {
        let points = (0..CHART_WINDOW)
            .rev()
            .map(|ago| {
                let sample = series.sample_ago(ago).unwrap_or(Sample::Timeout);
                ChartPoint::from_sample(-(ago as i32), sample)
            })
            .collect();

        Self {
            label: series.label.clone(),
            points,
            stale: series.stale,
        }
    }

    /// Reply points as `(x, y)` pairs, clamped to the axis.
    pub fn replies(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter(|p| p.status == PointStatus::Success)
            .map(|p| (p.seconds_ago as f64, p.value.clamp(0.0, Y_MAX)))
            .collect()
    }

    /// Timeout points as `(x, 0.0)` pairs.
    pub fn timeouts(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter(|p| p.status == PointStatus::Timeout)
            .map(|p| (p.seconds_ago as f64, 0.0))
            .collect()
    }

    pub fn latest(&self) -> Option<&ChartPoint> {
        self.points.last()
    }
}

/// Latency axis labels: `0.0, 2.5, ... 12.5`.
pub fn y_labels() -> Vec<String> {
    let steps = (Y_MAX / Y_STEP).round() as usize;
    (0..=steps).map(|i| format!("{:.1}", i as f64 * Y_STEP)).collect()
}

/// Time axis labels, oldest to newest.
pub fn x_labels() -> [&'static str; 3] {
    ["-59", "-30", "0"]
}
