//! Fixed-interval polling of the monitor service.
//!
//! A background task ticks once per [`POLL_INTERVAL`] and fires an
//! independent request on each tick, so a slow response never delays the
//! next cycle. Every request carries a sequence number; results that arrive
//! after a newer one has been applied are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::{ApiError, DataSource, MonitorApi, Snapshot};

/// Period of the refresh cycle.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug)]
struct PollResult {
    seq: u64,
    result: Result<Snapshot, ApiError>,
}

/// A data source that polls a [`MonitorApi`] in the background.
///
/// Must be created inside a tokio runtime. Dropping the poller stops the
/// timer; requests already on the wire finish and are ignored.
///
/// ```
/// use std::sync::Arc;
/// use tunnelwatch::{DataSource, HttpApi, Poller};
///
/// # tokio_test::block_on(async {
/// let api = Arc::new(HttpApi::builder().endpoint("http://monitor.lan:5000").build().unwrap());
/// let source = Poller::spawn(api);
/// assert_eq!(source.description(), "http: http://monitor.lan:5000");
/// # });
/// ```
#[derive(Debug)]
pub struct Poller {
    receiver: mpsc::UnboundedReceiver<PollResult>,
    task: JoinHandle<()>,
    description: String,
    last_applied: u64,
    last_error: Option<String>,
}

impl Poller {
    /// Start polling at the standard one-second period.
    pub fn spawn(api: Arc<dyn MonitorApi>) -> Self {
        Self::with_interval(api, POLL_INTERVAL)
    }

    /// Start polling at a custom period.
    pub fn with_interval(api: Arc<dyn MonitorApi>, period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let description = api.description().to_string();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut seq = 0u64;

            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                seq += 1;

                let api = api.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = api.fetch_snapshot().await;
                    let _ = tx.send(PollResult { seq, result });
                });
            }
        });

        Self {
            receiver: rx,
            task,
            description,
            last_applied: 0,
            last_error: None,
        }
    }

    /// Sequence number of the most recently applied snapshot (0 before the first).
    pub fn last_applied(&self) -> u64 {
        self.last_applied
    }
}

impl DataSource for Poller {
    fn poll(&mut self) -> Option<Snapshot> {
        let mut latest = None;

        while let Ok(PollResult { seq, result }) = self.receiver.try_recv() {
            if seq <= self.last_applied {
                debug!(seq, last_applied = self.last_applied, "discarding stale poll response");
                continue;
            }
            match result {
                Ok(snapshot) => {
                    self.last_applied = seq;
                    self.last_error = None;
                    latest = Some(snapshot);
                }
                Err(e) => {
                    warn!(seq, error = %e, "poll failed, skipping cycle");
                    self.last_error = Some(e.to_string());
                }
            }
        }

        latest
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::FakeApi;
    use crate::source::Sample;

    fn snapshot_with(host: &str, samples: Vec<Sample>) -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.hosts.insert(host.to_string(), samples);
        snapshot
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_every_second() {
        let api = Arc::new(FakeApi::new());
        let _poller = Poller::spawn(api.clone());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(api.fetch_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_is_skipped() {
        let api = Arc::new(FakeApi::new());
        api.script_snapshot(Err(ApiError::Timeout));
        api.script_snapshot(Ok(snapshot_with("a", vec![Sample::Reply(1.0)])));
        let mut poller = Poller::spawn(api.clone());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(poller.poll().is_none());
        assert_eq!(poller.error(), Some("Request timed out"));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let snapshot = poller.poll().unwrap();
        assert!(snapshot.samples("a").is_some());
        assert!(poller.error().is_none());
        assert_eq!(poller.last_applied(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_response_discarded() {
        let api = Arc::new(FakeApi::new());
        let slow = snapshot_with("old", vec![Sample::Timeout]);
        let fast = snapshot_with("new", vec![Sample::Reply(2.0)]);
        api.script_snapshot_after(Duration::from_millis(1500), Ok(slow));
        api.script_snapshot_after(Duration::from_millis(100), Ok(fast));
        let mut poller = Poller::spawn(api.clone());

        // Second request (sent at 1000ms) answers at 1100ms.
        tokio::time::sleep(Duration::from_millis(1200)).await;
        let snapshot = poller.poll().unwrap();
        assert!(snapshot.samples("new").is_some());
        assert_eq!(poller.last_applied(), 2);

        // First request answers at 1500ms and must not overwrite it.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(poller.poll().is_none());
        assert_eq!(poller.last_applied(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let api = Arc::new(FakeApi::new());
        let poller = Poller::spawn(api.clone());
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(poller);

        let calls = api.fetch_calls();
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(api.fetch_calls(), calls);
    }
}
