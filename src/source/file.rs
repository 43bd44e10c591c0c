//! File-based data source.
//!
//! Replays a `ping_results` JSON dump, e.g. one captured with
//! `curl http://monitor:5000/api/ping_results > ping_results.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

use super::{DataSource, Snapshot};

/// A data source that reads snapshots from a JSON file.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<Snapshot> {
        let result = fs::read_to_string(&self.path)
            .map_err(|e| format!("Read error: {}", e))
            .and_then(|content| {
                Snapshot::from_json(&content).map_err(|e| format!("Parse error: {}", e))
            });

        match result {
            Ok(snapshot) => {
                self.last_error = None;
                Some(snapshot)
            }
            Err(e) => {
                if self.last_error.as_deref() != Some(e.as_str()) {
                    warn!(path = %self.path.display(), error = %e, "failed to load snapshot file");
                }
                self.last_error = Some(e);
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Snapshot> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(snapshot) = self.read_file() {
                self.last_modified = current_modified;
                return Some(snapshot);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "172.20.3.108": [1.2, null, 1.4],
            "auto_reset_status": "Monitoring",
            "tunnels_down": false
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/ping_results.json");
        assert_eq!(source.path(), Path::new("/tmp/ping_results.json"));
        assert_eq!(source.description(), "file: /tmp/ping_results.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.samples("172.20.3.108").map(<[_]>::len), Some(3));
        assert_eq!(snapshot.auto_reset_status.as_deref(), Some("Monitoring"));

        // Unchanged file yields nothing new
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/ping_results.json");

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"172.20.3.108": "up"}}"#).unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }
}
