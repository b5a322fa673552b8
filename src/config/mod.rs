// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! Configuration module

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{Channel, SensorCatalog, SensorSpec};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for calibration file, reading log and reports
    pub data_dir: PathBuf,

    /// Run against the simulated bench instead of real ADCs
    pub demo_mode: bool,

    /// Supply voltage feeding the sensor dividers, in volts.
    /// 5.0 on the reference board; varies by hardware revision.
    pub supply_voltage: f64,

    /// ADC device registry
    pub adcs: AdcConfig,

    /// Calibration pacing and storage
    pub calibration: CalibrationConfig,

    /// Reading-pass pacing and storage
    pub reading: ReadingConfig,

    /// Report output naming
    pub report: ReportConfig,

    /// Sensor wiring and curve parameters, in bench order.
    /// Wiring is data, not code: the two reference rigs route the same
    /// sensors to different channels.
    pub sensors: Vec<SensorSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            demo_mode: false,
            supply_voltage: 5.0,
            adcs: AdcConfig::default(),
            calibration: CalibrationConfig::default(),
            reading: ReadingConfig::default(),
            report: ReportConfig::default(),
            sensors: default_sensor_table(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("mqsense"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Build the sensor catalog from the configured wiring table.
    pub fn catalog(&self) -> SensorCatalog {
        SensorCatalog::new(self.sensors.clone())
    }

    /// Resolved path of the persisted calibration table.
    pub fn calibration_path(&self) -> PathBuf {
        self.data_dir.join(&self.calibration.file)
    }

    /// Resolved path of the reading log.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.reading.log_file)
    }
}

/// ADC device registry: which I2C bus, and which address each named device
/// answers on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdcConfig {
    /// Linux I2C bus number (/dev/i2c-N)
    pub i2c_bus: u8,

    /// Device name -> I2C address. Sensor specs reference devices by name.
    pub addresses: HashMap<String, u16>,
}

impl Default for AdcConfig {
    fn default() -> Self {
        let mut addresses = HashMap::new();
        addresses.insert("ads2".to_string(), 0x48); // ADDR -> GND
        addresses.insert("ads1".to_string(), 0x49); // ADDR -> VCC
        Self {
            i2c_bus: 1,
            addresses,
        }
    }
}

/// Calibration run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Voltage samples averaged per sensor
    pub samples: usize,

    /// Pause between samples, to ride out ADC noise and signal ripple
    pub sample_interval_ms: u64,

    /// Settle time before the run starts, with sensors in clean air
    pub warmup_secs: u64,

    /// Calibration table filename, relative to the data directory
    pub file: PathBuf,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            sample_interval_ms: 100,
            warmup_secs: 2,
            file: PathBuf::from("calibration.json"),
        }
    }
}

/// Reading-pass parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingConfig {
    /// Pause between sensors within a pass
    pub sensor_interval_ms: u64,

    /// Reading log filename, relative to the data directory
    pub log_file: PathBuf,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            sensor_interval_ms: 1000,
            log_file: PathBuf::from("gas_readings.json"),
        }
    }
}

/// Report output parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Filename stem; reports land at `<data_dir>/<stem>_<timestamp>.{json,csv}`
    pub stem: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            stem: "gas_report".to_string(),
        }
    }
}

/// Factory wiring table for the reference rig: eight MQ sensors split across
/// two ADS1115 devices.
fn default_sensor_table() -> Vec<SensorSpec> {
    let table: [(&str, &str, Channel, f64, f64, f64, f64); 8] = [
        ("MQ-2", "ads2", Channel::A0, 9.83, 20.0, 1000.0, -2.2),
        ("MQ-3", "ads2", Channel::A2, 60.0, 200.0, 200.0, -2.1),
        ("MQ-4", "ads1", Channel::A3, 4.4, 20.0, 400.0, -1.9),
        ("MQ-5", "ads1", Channel::A2, 6.5, 20.0, 300.0, -2.0),
        ("MQ-6", "ads1", Channel::A0, 10.0, 60.0, 500.0, -2.3),
        ("MQ-7", "ads1", Channel::A1, 27.0, 10.0, 700.0, -2.5),
        ("MQ-8", "ads2", Channel::A1, 70.0, 10.0, 150.0, -1.8),
        ("MQ-135", "ads2", Channel::A3, 3.6, 20.0, 220.0, -2.1),
    ];

    table
        .into_iter()
        .map(
            |(id, adc, channel, clean_air_ratio, load_resistance, coeff_a, coeff_b)| SensorSpec {
                id: id.to_string(),
                adc: adc.to_string(),
                channel,
                clean_air_ratio,
                load_resistance,
                coeff_a,
                coeff_b,
            },
        )
        .collect()
}
