//! Host id to display label mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Human-readable names for monitored hosts, supplied by configuration.
///
/// Hosts without an entry are shown by their id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostLabels(BTreeMap<String, String>);

impl HostLabels {
    /// Labels of the reference deployment's three tunnel endpoints.
    pub fn reference() -> Self {
        [
            ("172.20.3.108", "Curator Service - 172.20.3.108"),
            ("172.20.3.198", "Process Engine - 172.20.3.198"),
            ("172.20.2.201", "Curator Gateway - 172.20.2.201"),
        ]
        .into_iter()
        .map(|(host, label)| (host.to_string(), label.to_string()))
        .collect()
    }

    /// Label for a host, falling back to its id.
    pub fn label_for(&self, host_id: &str) -> String {
        self.0.get(host_id).cloned().unwrap_or_else(|| host_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for HostLabels {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
