//! Bounded per-host latency history.

use std::collections::{BTreeMap, VecDeque};

use super::chart::ChartSeries;
use super::labels::HostLabels;
use super::stats::{HistoryGrid, HostSummary};
use crate::source::{Sample, Snapshot};

/// Maximum number of samples kept per host.
pub const SERIES_CAPACITY: usize = 60;

/// Latency history of one host, oldest sample first.
#[derive(Debug, Clone)]
pub struct HostSeries {
    pub host_id: String,
    pub label: String,
    samples: VecDeque<Sample>,
    /// The host was missing from the most recent snapshot.
    pub stale: bool,
}

impl HostSeries {
    fn new(host_id: &str, label: String) -> Self {
        Self {
            host_id: host_id.to_string(),
            label,
            samples: VecDeque::with_capacity(SERIES_CAPACITY),
            stale: false,
        }
    }

    /// Replace the history with the newest [`SERIES_CAPACITY`] samples.
    fn replace(&mut self, samples: &[Sample]) {
        let start = samples.len().saturating_sub(SERIES_CAPACITY);
        self.samples.clear();
        self.samples.extend(samples[start..].iter().copied());
        self.stale = false;
    }

    pub fn samples(&self) -> &VecDeque<Sample> {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    /// The newest `n` samples (fewer if the history is shorter), oldest first.
    pub fn window(&self, n: usize) -> impl Iterator<Item = Sample> + '_ {
        self.samples.iter().skip(self.samples.len().saturating_sub(n)).copied()
    }

    /// Sample recorded `seconds_ago` cycles before the latest one.
    pub fn sample_ago(&self, seconds_ago: usize) -> Option<Sample> {
        let index = self.samples.len().checked_sub(seconds_ago + 1)?;
        self.samples.get(index).copied()
    }

    pub fn summary(&self) -> HostSummary {
        HostSummary::from_series(self)
    }

    pub fn chart(&self) -> ChartSeries {
        ChartSeries::from_series(self)
    }
}

/// Owns every [`HostSeries`] seen during the session.
#[derive(Debug, Clone, Default)]
pub struct MetricStore {
    series: BTreeMap<String, HostSeries>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the per-host arrays of a freshly polled snapshot.
    ///
    /// Each host's history becomes the tail of its array in this snapshot.
    /// New hosts are added; hosts absent from the snapshot are kept but
    /// flagged stale.
    pub fn update(&mut self, snapshot: &Snapshot, labels: &HostLabels) {
        for series in self.series.values_mut() {
            series.stale = true;
        }

        for host_id in snapshot.host_ids() {
            let Some(samples) = snapshot.samples(host_id) else {
                continue;
            };
            self.series
                .entry(host_id.to_string())
                .or_insert_with(|| HostSeries::new(host_id, labels.label_for(host_id)))
                .replace(samples);
        }
    }

    /// All series, ordered by host id.
    pub fn series(&self) -> impl Iterator<Item = &HostSeries> {
        self.series.values()
    }

    pub fn get(&self, host_id: &str) -> Option<&HostSeries> {
        self.series.get(host_id)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Table-view rows for every host.
    pub fn summaries(&self) -> Vec<HostSummary> {
        self.series().map(HostSeries::summary).collect()
    }

    /// Chart-view series for every host.
    pub fn charts(&self) -> Vec<ChartSeries> {
        self.series().map(HostSeries::chart).collect()
    }

    /// Recent-history grid across all hosts.
    pub fn history_grid(&self) -> HistoryGrid {
        HistoryGrid::from_series(self.series())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(hosts: &[(&str, Vec<Sample>)]) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (host, samples) in hosts {
            snapshot.hosts.insert(host.to_string(), samples.clone());
        }
        snapshot
    }

    fn replies(n: usize) -> Vec<Sample> {
        (0..n).map(|i| Sample::Reply(i as f64)).collect()
    }

    #[test]
    fn test_series_capped_at_capacity() {
        let mut store = MetricStore::new();
        store.update(&snapshot(&[("a", replies(300))]), &HostLabels::default());

        let series = store.get("a").unwrap();
        assert_eq!(series.len(), SERIES_CAPACITY);
        assert_eq!(series.samples().front(), Some(&Sample::Reply(240.0)));
        assert_eq!(series.latest(), Some(Sample::Reply(299.0)));
    }

    #[test]
    fn test_update_replaces_rather_than_accumulates() {
        let mut store = MetricStore::new();
        let labels = HostLabels::default();
        store.update(&snapshot(&[("a", replies(5))]), &labels);
        store.update(&snapshot(&[("a", replies(3))]), &labels);

        assert_eq!(store.get("a").unwrap().len(), 3);
    }

    #[test]
    fn test_new_hosts_created_and_missing_hosts_kept() {
        let mut store = MetricStore::new();
        let labels = HostLabels::reference();
        store.update(&snapshot(&[("172.20.3.108", replies(2))]), &labels);
        store.update(&snapshot(&[("10.9.9.9", replies(1))]), &labels);

        assert_eq!(store.len(), 2);
        let old = store.get("172.20.3.108").unwrap();
        assert!(old.stale);
        assert_eq!(old.len(), 2);
        assert_eq!(old.label, "Curator Service - 172.20.3.108");

        let new = store.get("10.9.9.9").unwrap();
        assert!(!new.stale);
        assert_eq!(new.label, "10.9.9.9");
    }

    #[test]
    fn test_window_is_newest_samples() {
        let mut store = MetricStore::new();
        store.update(&snapshot(&[("a", replies(25))]), &HostLabels::default());

        let window: Vec<Sample> = store.get("a").unwrap().window(10).collect();
        assert_eq!(window.len(), 10);
        assert_eq!(window.first(), Some(&Sample::Reply(15.0)));
        assert_eq!(window.last(), Some(&Sample::Reply(24.0)));
    }

    #[test]
    fn test_sample_ago() {
        let mut store = MetricStore::new();
        store.update(&snapshot(&[("a", replies(3))]), &HostLabels::default());

        let series = store.get("a").unwrap();
        assert_eq!(series.sample_ago(0), Some(Sample::Reply(2.0)));
        assert_eq!(series.sample_ago(2), Some(Sample::Reply(0.0)));
        assert_eq!(series.sample_ago(3), None);
    }

    #[test]
    fn test_every_series_bounded_for_arbitrary_lengths() {
        let mut store = MetricStore::new();
        for n in [0, 1, 59, 60, 61, 120] {
            store.update(&snapshot(&[("a", replies(n)), ("b", vec![Sample::Timeout; n])]), &HostLabels::default());
            for series in store.series() {
                assert!(series.len() <= SERIES_CAPACITY);
                assert_eq!(series.len(), n.min(SERIES_CAPACITY));
            }
        }
    }
}
