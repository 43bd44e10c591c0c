//! Wire types for ping-monitor snapshots.
//!
//! A snapshot is a flat JSON object: every host id maps to its latency
//! history (`number | null`, oldest first), alongside a handful of reserved
//! status keys written by the monitor service itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Snapshot keys that carry service status rather than a host series.
pub const RESERVED_KEYS: &[&str] = &["auto_reset_status", "tunnels_down", "ssh_output"];

/// A single latency probe result.
///
/// Serialized as a bare number for a reply and `null` for a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Sample {
    /// The host answered within the probe timeout.
    Reply(f64),
    /// No reply (RTO).
    Timeout,
}

impl Sample {
    /// Latency in milliseconds, if the probe got a reply.
    pub fn latency(&self) -> Option<f64> {
        match self {
            Sample::Reply(ms) => Some(*ms),
            Sample::Timeout => None,
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, Sample::Reply(_))
    }

    /// Human-readable form used in tooltips and grids: `"9.8 ms"` or `"Timeout"`.
    pub fn describe(&self) -> String {
        match self {
            Sample::Reply(ms) => format!("{:.1} ms", ms),
            Sample::Timeout => "Timeout".to_string(),
        }
    }
}

impl From<Option<f64>> for Sample {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Sample::Timeout, Sample::Reply)
    }
}

impl From<Sample> for Option<f64> {
    fn from(sample: Sample) -> Self {
        sample.latency()
    }
}

/// One poll cycle's complete view of the monitor service.
///
/// Missing status keys fall back to their defaults. A host entry that is not
/// an array of `number | null` rejects the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Free-form status of the service-side auto reset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_reset_status: Option<String>,

    /// Set by the service once every tunnel has failed for long enough.
    #[serde(default)]
    pub tunnels_down: bool,

    /// Transcript of the most recent remote reset session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_output: Option<Vec<String>>,

    /// Latency history keyed by host id.
    #[serde(flatten)]
    pub hosts: BTreeMap<String, Vec<Sample>>,
}

impl Snapshot {
    /// Parse a snapshot from its JSON text.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Host ids in this snapshot, reserved keys excluded.
    pub fn host_ids(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str).filter(|k| !RESERVED_KEYS.contains(k))
    }

    /// Samples for one host, if present.
    pub fn samples(&self, host_id: &str) -> Option<&[Sample]> {
        self.hosts.get(host_id).map(Vec::as_slice)
    }
}
