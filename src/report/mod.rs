// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! Summary reports - min/max/avg per sensor, exported as JSON and CSV

use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::logbook::ReadingEntry;
use crate::util::ordered_map;

/// Aggregate statistics for one sensor across the whole log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Lowest estimate seen, in ppm.
    pub min: f64,
    /// Highest estimate seen, in ppm.
    pub max: f64,
    /// Arithmetic mean of all estimates, in ppm.
    pub avg: f64,
}

/// Per-sensor statistics in first-seen order.
///
/// Serializes as a JSON object keyed by sensor id, like the log entries it
/// is derived from.
#[derive(Debug, Clone, Default)]
pub struct SummaryReport {
    sensors: Vec<(String, SummaryStats)>,
}

impl SummaryReport {
    /// Statistics for a sensor, if it appears anywhere in the log.
    pub fn stats_for(&self, sensor: &str) -> Option<&SummaryStats> {
        self.sensors
            .iter()
            .find(|(id, _)| id == sensor)
            .map(|(_, stats)| stats)
    }

    /// Iterate sensors in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, SummaryStats)> {
        self.sensors.iter()
    }

    /// Number of sensors in the report.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// True when the report covers no sensors.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| Error::persistence(path, e))?;
        std::fs::write(path, content).map_err(|e| Error::persistence(path, e))?;
        Ok(())
    }

    /// Write the report as CSV, one row per sensor.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        self.write_csv_inner(path)
            .map_err(|e| Error::persistence(path, e))
    }

    fn write_csv_inner(&self, path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut out = BufWriter::new(file);

        writeln!(out, "Sensor,Min (ppm),Max (ppm),Avg (ppm)")?;
        for (id, stats) in &self.sensors {
            writeln!(out, "{},{:.2},{:.2},{:.2}", id, stats.min, stats.max, stats.avg)?;
        }

        out.flush()
    }
}

impl Serialize for SummaryReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ordered_map::serialize(&self.sensors, serializer)
    }
}

impl<'de> Deserialize<'de> for SummaryReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self {
            sensors: ordered_map::deserialize(deserializer)?,
        })
    }
}

/// Fold the log into per-sensor statistics.
///
/// Sensors appear in the report in the order they first appear anywhere in
/// the log, so a sensor that joined the bench mid-log still shows up, last.
pub fn aggregate(entries: &[ReadingEntry]) -> SummaryReport {
    struct Acc {
        min: f64,
        max: f64,
        sum: f64,
        count: usize,
    }

    let mut order: Vec<String> = Vec::new();
    let mut accs: HashMap<String, Acc> = HashMap::new();

    for entry in entries {
        for (id, ppm) in &entry.readings {
            match accs.get_mut(id) {
                Some(acc) => {
                    acc.min = acc.min.min(*ppm);
                    acc.max = acc.max.max(*ppm);
                    acc.sum += ppm;
                    acc.count += 1;
                }
                None => {
                    order.push(id.clone());
                    accs.insert(
                        id.clone(),
                        Acc {
                            min: *ppm,
                            max: *ppm,
                            sum: *ppm,
                            count: 1,
                        },
                    );
                }
            }
        }
    }

    let sensors = order
        .into_iter()
        .filter_map(|id| {
            let acc = accs.remove(&id)?;
            let stats = SummaryStats {
                min: acc.min,
                max: acc.max,
                avg: acc.sum / acc.count as f64,
            };
            Some((id, stats))
        })
        .collect();

    SummaryReport { sensors }
}

/// Where a generated report landed.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    /// The JSON rendition.
    pub json: PathBuf,
    /// The CSV rendition.
    pub csv: PathBuf,
}

/// Aggregate the log and write both report files under `dir` as
/// `<stem>.json` and `<stem>.csv`.
///
/// An empty log yields [`Error::EmptyLog`] and writes nothing.
pub fn generate(entries: &[ReadingEntry], dir: &Path, stem: &str) -> Result<ReportPaths> {
    if entries.is_empty() {
        return Err(Error::EmptyLog);
    }

    let report = aggregate(entries);
    std::fs::create_dir_all(dir).map_err(|e| Error::persistence(dir, e))?;

    let paths = ReportPaths {
        json: dir.join(format!("{stem}.json")),
        csv: dir.join(format!("{stem}.csv")),
    };

    report.write_json(&paths.json)?;
    report.write_csv(&paths.csv)?;

    info!(
        "Report over {} passes and {} sensors written to {:?} and {:?}",
        entries.len(),
        report.len(),
        paths.json,
        paths.csv
    );
    Ok(paths)
}
