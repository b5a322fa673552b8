// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! Reading log - the append-only record every report is built from

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// One timestamped sweep of the bench.
///
/// `readings` keeps sensors in the order they were swept; the log and the
/// reports built from it present sensors in that same first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingEntry {
    /// RFC 3339 UTC timestamp of the sweep.
    pub timestamp: String,

    /// Sensor id -> ppm, in sweep order.
    #[serde(with = "crate::util::ordered_map")]
    pub readings: Vec<(String, f64)>,
}

impl ReadingEntry {
    /// Empty entry stamped with the current UTC time.
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            readings: Vec::new(),
        }
    }

    /// Append one sensor's estimate.
    pub fn push(&mut self, sensor: &str, ppm: f64) {
        self.readings.push((sensor.to_string(), ppm));
    }

    /// True when the sweep produced no estimates at all.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// The reading log file: a JSON array of entries, appended one sweep at a
/// time.
#[derive(Debug, Clone)]
pub struct ReadingLog {
    path: PathBuf,
}

impl ReadingLog {
    /// Log backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every entry.
    ///
    /// A missing or corrupt file is an error; an existing file holding an
    /// empty array is a valid, empty log. Callers that want to treat the two
    /// differently can, so "never ran" and "ran but saw nothing" stay
    /// distinguishable.
    pub fn load(&self) -> Result<Vec<ReadingEntry>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| Error::persistence(&self.path, e))?;
        let entries =
            serde_json::from_str(&content).map_err(|e| Error::persistence(&self.path, e))?;
        Ok(entries)
    }

    /// Append one entry, rewriting the whole array. A missing file starts a
    /// fresh log.
    ///
    /// Load-modify-write keeps the file a plain JSON array that any tool can
    /// read; at one sweep a second the rewrite cost never matters.
    pub fn append(&self, entry: &ReadingEntry) -> Result<()> {
        let mut entries = if self.path.exists() {
            self.load()?
        } else {
            Vec::new()
        };
        entries.push(entry.clone());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::persistence(&self.path, e))?;
        }

        let content = serde_json::to_string_pretty(&entries)
            .map_err(|e| Error::persistence(&self.path, e))?;
        std::fs::write(&self.path, content).map_err(|e| Error::persistence(&self.path, e))?;

        info!(
            "Logged pass {} ({} readings) to {:?}",
            entries.len(),
            entry.readings.len(),
            self.path
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(readings: &[(&str, f64)]) -> ReadingEntry {
        let mut e = ReadingEntry::now();
        for (id, ppm) in readings {
            e.push(id, *ppm);
        }
        e
    }

    #[test]
    fn test_loading_a_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReadingLog::new(dir.path().join("gas_readings.json"));

        assert!(matches!(log.load(), Err(Error::Persistence { .. })));
    }

    #[test]
    fn test_appending_to_a_missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReadingLog::new(dir.path().join("gas_readings.json"));

        log.append(&entry(&[("MQ-2", 8.5)])).unwrap();
        assert_eq!(log.load().unwrap().len(), 1);
    }

    #[test]
    fn test_append_accumulates_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReadingLog::new(dir.path().join("gas_readings.json"));

        log.append(&entry(&[("MQ-2", 8.5), ("MQ-7", 3.1)])).unwrap();
        log.append(&entry(&[("MQ-2", 9.0)])).unwrap();

        let entries = log.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].readings.len(), 2);
        assert_eq!(entries[1].readings[0], ("MQ-2".to_string(), 9.0));
    }

    #[test]
    fn test_entries_keep_sweep_order_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReadingLog::new(dir.path().join("gas_readings.json"));

        log.append(&entry(&[("MQ-7", 1.0), ("MQ-2", 2.0), ("MQ-135", 3.0)]))
            .unwrap();

        let back = log.load().unwrap();
        let ids: Vec<_> = back[0].readings.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["MQ-7", "MQ-2", "MQ-135"]);
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gas_readings.json");
        std::fs::write(&path, "not json at all").unwrap();

        let log = ReadingLog::new(&path);
        assert!(matches!(log.load(), Err(Error::Persistence { .. })));
    }
}
