// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! Concentration estimation - from divider voltage to gas ppm

use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::adc::VoltageSource;
use crate::calibration::CalibrationTable;
use crate::catalog::{SensorCatalog, SensorSpec};
use crate::error::{Error, Result};
use crate::logbook::ReadingEntry;

/// Sensor resistance from the divider equation, in the same unit as
/// `r_load`: Rs = (Vsupply - V) / V * Rload.
///
/// Returns `None` unless `0 < volts < v_supply`; at either rail the divider
/// equation degenerates and there is no finite positive resistance.
pub fn sensor_resistance(v_supply: f64, volts: f64, r_load: f64) -> Option<f64> {
    if volts <= 0.0 || volts >= v_supply {
        return None;
    }
    Some((v_supply - volts) / volts * r_load)
}

/// Gas concentration from the sensor's power-law response curve:
/// ppm = A * (Rs/Ro)^B.
pub fn concentration(spec: &SensorSpec, ro: f64, volts: f64, v_supply: f64) -> Result<f64> {
    let rs = sensor_resistance(v_supply, volts, spec.load_resistance).ok_or_else(|| {
        Error::InvalidReading {
            sensor: spec.id.clone(),
            volts,
        }
    })?;

    let ratio = rs / ro;
    Ok(spec.coeff_a * ratio.powf(spec.coeff_b))
}

/// Turns voltages into ppm estimates using the calibrated baselines.
pub struct ConcentrationEstimator<'a> {
    catalog: &'a SensorCatalog,
    table: &'a CalibrationTable,
    supply_voltage: f64,
}

impl<'a> ConcentrationEstimator<'a> {
    /// New estimator over a catalog and its calibration table.
    pub fn new(catalog: &'a SensorCatalog, table: &'a CalibrationTable, supply_voltage: f64) -> Self {
        Self {
            catalog,
            table,
            supply_voltage,
        }
    }

    /// Estimate the concentration seen by one sensor right now.
    pub fn estimate(&self, sensor: &str, source: &mut dyn VoltageSource) -> Result<f64> {
        let spec = self.catalog.spec_for(sensor)?;
        let ro = self.table.baseline_for(sensor)?;
        let volts = source.read_voltage(&spec.adc, spec.channel)?;

        concentration(spec, ro, volts, self.supply_voltage)
    }

    /// Sweep the whole bench once, in catalog order, pausing between
    /// sensors.
    ///
    /// A sensor that fails is logged and left out of the entry; the sweep
    /// carries on with the rest of the bench.
    pub fn read_pass(
        &self,
        source: &mut dyn VoltageSource,
        sensor_interval: Duration,
    ) -> ReadingEntry {
        let mut entry = ReadingEntry::now();
        let mut first = true;

        for spec in self.catalog.iter() {
            if !first {
                thread::sleep(sensor_interval);
            }
            first = false;

            match self.estimate(&spec.id, source) {
                Ok(ppm) => {
                    info!("{}: {:.2} ppm", spec.id, ppm);
                    entry.push(&spec.id, ppm);
                }
                Err(e) => {
                    warn!("Skipping {} this pass: {}", spec.id, e);
                }
            }
        }

        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibrator;
    use crate::catalog::Channel;

    fn spec(id: &str) -> SensorSpec {
        SensorSpec {
            id: id.to_string(),
            adc: "ads2".to_string(),
            channel: Channel::A0,
            clean_air_ratio: 9.83,
            load_resistance: 20.0,
            coeff_a: 1000.0,
            coeff_b: -2.2,
        }
    }

    struct FixedSource(f64);

    impl VoltageSource for FixedSource {
        fn read_voltage(&mut self, _adc: &str, _channel: Channel) -> Result<f64> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_divider_equation() {
        // 1.0 V out of 5.0 V across a 20 kOhm load leaves 80 kOhm of sensor.
        assert_eq!(sensor_resistance(5.0, 1.0, 20.0), Some(80.0));

        // Midpoint: both halves equal.
        assert_eq!(sensor_resistance(5.0, 2.5, 20.0), Some(20.0));
    }

    #[test]
    fn test_divider_rejects_railed_samples() {
        assert_eq!(sensor_resistance(5.0, 0.0, 20.0), None);
        assert_eq!(sensor_resistance(5.0, 5.0, 20.0), None);
        assert_eq!(sensor_resistance(5.0, -0.1, 20.0), None);
        assert_eq!(sensor_resistance(5.0, 5.2, 20.0), None);
    }

    #[test]
    fn test_unit_ratio_yields_coeff_a_exactly() {
        // Rs == Ro means ratio^B == 1, so the estimate is exactly A.
        let spec = spec("MQ-2");
        let rs = sensor_resistance(5.0, 1.0, spec.load_resistance).unwrap();
        let ppm = concentration(&spec, rs, 1.0, 5.0).unwrap();

        assert_eq!(ppm, spec.coeff_a);
    }

    #[test]
    fn test_reference_concentration() {
        // At the clean-air ratio itself: ppm = 1000 * 9.83^-2.2 = 8.47...
        let spec = spec("MQ-2");
        let ro = 80.0 / 9.83;
        let ppm = concentration(&spec, ro, 1.0, 5.0).unwrap();

        assert!((ppm - 8.47).abs() < 0.01);
    }

    #[test]
    fn test_estimate_requires_a_baseline() {
        let catalog = SensorCatalog::new(vec![spec("MQ-2")]);
        let table = CalibrationTable::new();
        let estimator = ConcentrationEstimator::new(&catalog, &table, 5.0);
        let mut source = FixedSource(1.0);

        assert!(matches!(
            estimator.estimate("MQ-2", &mut source),
            Err(Error::MissingCalibration(id)) if id == "MQ-2"
        ));
    }

    #[test]
    fn test_read_pass_skips_uncalibrated_sensors() {
        let catalog = SensorCatalog::new(vec![spec("MQ-2"), spec("MQ-3")]);
        let mut table = CalibrationTable::new();
        table.insert("MQ-2", 80.0 / 9.83);

        let estimator = ConcentrationEstimator::new(&catalog, &table, 5.0);
        let mut source = FixedSource(1.0);
        let entry = estimator.read_pass(&mut source, Duration::ZERO);

        let ids: Vec<_> = entry.readings.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["MQ-2"]);
    }

    #[test]
    fn test_calibrated_simulated_bench_reads_near_clean_air() {
        use crate::adc::SimulatedBench;
        use crate::config::CalibrationConfig;

        let catalog = SensorCatalog::new(vec![spec("MQ-2")]);
        let cal_config = CalibrationConfig {
            samples: 50,
            sample_interval_ms: 0,
            warmup_secs: 0,
            file: std::path::PathBuf::from("calibration.json"),
        };

        let mut bench = SimulatedBench::with_seed(5.0, 11);
        let outcome = Calibrator::new(&cal_config, 5.0).calibrate(&catalog, &mut bench);
        assert!(outcome.failures.is_empty());

        // The simulated divider sits at its baseline, so a fresh estimate
        // lands near the clean-air concentration: 1000 * 9.83^-2.2.
        let estimator = ConcentrationEstimator::new(&catalog, &outcome.table, 5.0);
        let ppm = estimator.estimate("MQ-2", &mut bench).unwrap();

        assert!((ppm - 8.47).abs() < 1.5, "ppm {ppm} far from clean air");
    }

    #[test]
    fn test_read_pass_keeps_catalog_order() {
        let catalog = SensorCatalog::new(vec![spec("MQ-7"), spec("MQ-2"), spec("MQ-135")]);
        let mut table = CalibrationTable::new();
        for id in ["MQ-7", "MQ-2", "MQ-135"] {
            table.insert(id, 5.0);
        }

        let estimator = ConcentrationEstimator::new(&catalog, &table, 5.0);
        let mut source = FixedSource(1.0);
        let entry = estimator.read_pass(&mut source, Duration::ZERO);

        let ids: Vec<_> = entry.readings.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["MQ-7", "MQ-2", "MQ-135"]);
    }
}
