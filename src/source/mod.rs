//! Data source abstraction for receiving ping-monitor snapshots.
//!
//! The dashboard reads snapshots through the [`DataSource`] trait so the UI
//! loop never waits on I/O:
//!
//! - [`Poller`]: polls the monitor service over HTTP once per second
//! - [`FileSource`]: replays a snapshot JSON file whenever it changes
//! - [`ChannelSource`]: receives snapshots pushed through a tokio watch channel
//!
//! The service itself is reached through the [`MonitorApi`] trait, implemented
//! over HTTP by [`HttpApi`].

mod api;
mod channel;
mod error;
mod file;
mod poller;
mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{HttpApi, HttpApiBuilder, MonitorApi, ResetResponse, DEFAULT_TIMEOUT};
pub use channel::ChannelSource;
pub use error::ApiError;
pub use file::FileSource;
pub use poller::{Poller, POLL_INTERVAL};
pub use snapshot::{Sample, Snapshot, RESERVED_KEYS};

use std::fmt::Debug;

/// Trait for receiving snapshots from various sources.
///
/// # Example
///
/// ```
/// use tunnelwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("ping_results.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} hosts", snapshot.hosts.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Take the latest snapshot, if a new one has arrived.
    ///
    /// Must not block.
    fn poll(&mut self) -> Option<Snapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The error from the most recent failed read, if the last read failed.
    fn error(&self) -> Option<&str>;
}
