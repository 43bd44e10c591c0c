//! Channel-based data source.
//!
//! Receives snapshots via a tokio watch channel, for embedding the dashboard
//! in a process that already owns the ping results.

use tokio::sync::watch;

use super::{DataSource, Snapshot};

/// A data source that receives snapshots via a channel.
///
/// # Example
///
/// ```
/// use tunnelwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("in-process pinger");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Snapshot>,
    description: String,
    initial_returned: bool,
}

impl ChannelSource {
    pub fn new(receiver: watch::Receiver<Snapshot>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
        }
    }

    /// Create a channel pair; push snapshots through the returned sender.
    pub fn create(source_description: &str) -> (watch::Sender<Snapshot>, Self) {
        let (tx, rx) = watch::channel(Snapshot::default());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Snapshot> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }
}
