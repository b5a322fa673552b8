// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! Clean-air calibration - establishing the Ro baseline for each sensor

use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::adc::VoltageSource;
use crate::catalog::{SensorCatalog, SensorSpec};
use crate::config::CalibrationConfig;
use crate::error::{Error, PersistenceError, Result};
use crate::estimator::sensor_resistance;

/// Schema version written into the calibration file. Bump when the layout
/// changes so stale files fail loudly instead of mis-parsing.
const SCHEMA_VERSION: u32 = 1;

/// Persisted Ro baselines, one per calibrated sensor, in ohm-compatible
/// units (kilo-ohms, matching the configured load resistances).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationTable {
    version: u32,
    baselines: HashMap<String, f64>,
}

impl CalibrationTable {
    /// Empty table at the current schema version.
    pub fn new() -> Self {
        Self {
            version: SCHEMA_VERSION,
            baselines: HashMap::new(),
        }
    }

    /// Store or replace the baseline for a sensor.
    pub fn insert(&mut self, sensor: &str, ro: f64) {
        self.baselines.insert(sensor.to_string(), ro);
    }

    /// Baseline for a sensor, or [`Error::MissingCalibration`].
    pub fn baseline_for(&self, sensor: &str) -> Result<f64> {
        self.baselines
            .get(sensor)
            .copied()
            .ok_or_else(|| Error::MissingCalibration(sensor.to_string()))
    }

    /// Number of calibrated sensors.
    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    /// True when no sensor has a baseline yet.
    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }

    /// Load a table from disk, rejecting unknown schema versions.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::persistence(path, e))?;
        let table: Self =
            serde_json::from_str(&content).map_err(|e| Error::persistence(path, e))?;

        if table.version != SCHEMA_VERSION {
            return Err(Error::persistence(
                path,
                PersistenceError::UnsupportedVersion(table.version),
            ));
        }

        info!("Loaded {} baselines from {:?}", table.len(), path);
        Ok(table)
    }

    /// Write the table to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::persistence(path, e))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| Error::persistence(path, e))?;
        std::fs::write(path, content).map_err(|e| Error::persistence(path, e))?;

        info!("Saved {} baselines to {:?}", self.len(), path);
        Ok(())
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::new()
    }
}

/// One sensor the calibration run could not establish a baseline for.
#[derive(Debug)]
pub struct CalibrationFailure {
    /// Sensor id.
    pub sensor: String,
    /// Why it failed.
    pub error: Error,
}

/// Result of a full calibration sweep: the baselines that were established,
/// and the sensors that had to be skipped.
#[derive(Debug)]
pub struct CalibrationOutcome {
    /// Baselines for every sensor that calibrated cleanly.
    pub table: CalibrationTable,
    /// Sensors that failed, with the error each one hit.
    pub failures: Vec<CalibrationFailure>,
}

/// Runs the clean-air sweep over the whole bench.
///
/// A sensor that fails mid-sweep is skipped and reported, never aborting the
/// run: on an eight-sensor bench one flaky divider should not cost the other
/// seven their fresh baselines.
pub struct Calibrator<'a> {
    config: &'a CalibrationConfig,
    supply_voltage: f64,
}

impl<'a> Calibrator<'a> {
    /// New calibrator over the given pacing parameters.
    pub fn new(config: &'a CalibrationConfig, supply_voltage: f64) -> Self {
        Self {
            config,
            supply_voltage,
        }
    }

    /// Calibrate every sensor in catalog order.
    ///
    /// The sensors must be in clean air for the whole sweep; the warmup
    /// pause at the start gives the operator a moment to confirm that.
    pub fn calibrate(
        &self,
        catalog: &SensorCatalog,
        source: &mut dyn VoltageSource,
    ) -> CalibrationOutcome {
        info!(
            "Starting calibration: {} sensors, {} samples each; ensure sensors are in clean air",
            catalog.len(),
            self.config.samples
        );
        thread::sleep(Duration::from_secs(self.config.warmup_secs));

        let mut table = CalibrationTable::new();
        let mut failures = Vec::new();

        for spec in catalog.iter() {
            match self.calibrate_sensor(spec, source) {
                Ok(ro) => {
                    info!("Calibrated {}: Ro = {:.3} kOhm", spec.id, ro);
                    table.insert(&spec.id, ro);
                }
                Err(e) => {
                    error!("Skipping {}: {}", spec.id, e);
                    failures.push(CalibrationFailure {
                        sensor: spec.id.clone(),
                        error: e,
                    });
                }
            }
        }

        CalibrationOutcome { table, failures }
    }

    /// Average the configured number of samples and derive Ro from the
    /// clean-air divider equation.
    fn calibrate_sensor(
        &self,
        spec: &SensorSpec,
        source: &mut dyn VoltageSource,
    ) -> Result<f64> {
        let interval = Duration::from_millis(self.config.sample_interval_ms);
        let mut sum = 0.0;

        for i in 0..self.config.samples {
            sum += source.read_voltage(&spec.adc, spec.channel)?;
            if i + 1 < self.config.samples {
                thread::sleep(interval);
            }
        }

        let mean = sum / self.config.samples as f64;
        let rs = sensor_resistance(self.supply_voltage, mean, spec.load_resistance)
            .ok_or_else(|| Error::InvalidReading {
                sensor: spec.id.clone(),
                volts: mean,
            })?;

        Ok(rs / spec.clean_air_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Channel;

    /// Fixed-voltage source for exercising the sweep without a bench.
    struct FixedSource {
        volts: f64,
        failing: Option<String>,
    }

    impl VoltageSource for FixedSource {
        fn read_voltage(&mut self, adc: &str, channel: Channel) -> Result<f64> {
            if self.failing.as_deref() == Some(adc) {
                return Err(Error::AdcRead {
                    adc: adc.to_string(),
                    channel,
                    message: "bus timeout".to_string(),
                });
            }
            Ok(self.volts)
        }
    }

    fn fast_config() -> CalibrationConfig {
        CalibrationConfig {
            samples: 5,
            sample_interval_ms: 0,
            warmup_secs: 0,
            file: std::path::PathBuf::from("calibration.json"),
        }
    }

    fn spec(id: &str, adc: &str) -> SensorSpec {
        SensorSpec {
            id: id.to_string(),
            adc: adc.to_string(),
            channel: Channel::A0,
            clean_air_ratio: 9.83,
            load_resistance: 20.0,
            coeff_a: 1000.0,
            coeff_b: -2.2,
        }
    }

    #[test]
    fn test_reference_sensor_baseline() {
        // 1.0 V on a 5.0 V supply with a 20 kOhm load: Rs = 80 kOhm,
        // Ro = 80 / 9.83 = 8.138...
        let config = fast_config();
        let calibrator = Calibrator::new(&config, 5.0);
        let catalog = SensorCatalog::new(vec![spec("MQ-2", "ads2")]);
        let mut source = FixedSource {
            volts: 1.0,
            failing: None,
        };

        let outcome = calibrator.calibrate(&catalog, &mut source);

        assert!(outcome.failures.is_empty());
        let ro = outcome.table.baseline_for("MQ-2").unwrap();
        assert!((ro - 8.138).abs() < 0.001);
    }

    #[test]
    fn test_failing_sensor_is_skipped_not_fatal() {
        let config = fast_config();
        let calibrator = Calibrator::new(&config, 5.0);
        let catalog = SensorCatalog::new(vec![spec("MQ-2", "ads2"), spec("MQ-4", "ads1")]);
        let mut source = FixedSource {
            volts: 1.0,
            failing: Some("ads1".to_string()),
        };

        let outcome = calibrator.calibrate(&catalog, &mut source);

        assert_eq!(outcome.table.len(), 1);
        assert!(outcome.table.baseline_for("MQ-2").is_ok());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].sensor, "MQ-4");
    }

    #[test]
    fn test_railed_sensor_yields_invalid_reading() {
        let config = fast_config();
        let calibrator = Calibrator::new(&config, 5.0);
        let catalog = SensorCatalog::new(vec![spec("MQ-2", "ads2")]);
        let mut source = FixedSource {
            volts: 5.0,
            failing: None,
        };

        let outcome = calibrator.calibrate(&catalog, &mut source);

        assert!(outcome.table.is_empty());
        assert!(matches!(
            outcome.failures[0].error,
            Error::InvalidReading { ref sensor, volts } if sensor == "MQ-2" && volts == 5.0
        ));
    }

    #[test]
    fn test_table_round_trip_and_version_gate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibration.json");

        let mut table = CalibrationTable::new();
        table.insert("MQ-2", 8.138);
        table.insert("MQ-7", 1.9);
        table.save(&path).unwrap();

        let back = CalibrationTable::load(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert!((back.baseline_for("MQ-2").unwrap() - 8.138).abs() < 1e-9);

        // A future schema version must be refused, not half-read.
        let doctored = std::fs::read_to_string(&path)
            .unwrap()
            .replace("\"version\": 1", "\"version\": 2");
        std::fs::write(&path, doctored).unwrap();

        assert!(matches!(
            CalibrationTable::load(&path),
            Err(Error::Persistence {
                source: PersistenceError::UnsupportedVersion(2),
                ..
            })
        ));
    }

    #[test]
    fn test_missing_baseline_error() {
        let table = CalibrationTable::new();
        assert!(matches!(
            table.baseline_for("MQ-3"),
            Err(Error::MissingCalibration(id)) if id == "MQ-3"
        ));
    }
}
