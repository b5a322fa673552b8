// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! Sensor catalog - wiring and empirical curve parameters for the MQ bench

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Single-ended input channel on an ADS1115.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// AIN0
    A0,
    /// AIN1
    A1,
    /// AIN2
    A2,
    /// AIN3
    A3,
}

impl Channel {
    /// Mux index as used by the ADC configuration register.
    pub fn index(self) -> u8 {
        match self {
            Channel::A0 => 0,
            Channel::A1 => 1,
            Channel::A2 => 2,
            Channel::A3 => 3,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::A0 => write!(f, "A0"),
            Channel::A1 => write!(f, "A1"),
            Channel::A2 => write!(f, "A2"),
            Channel::A3 => write!(f, "A3"),
        }
    }
}

/// Physical wiring and datasheet-fitted curve parameters for one MQ sensor.
///
/// `coeff_a` and `coeff_b` come from the sensor's log-log response curve:
/// `ppm = coeff_a * (Rs/Ro)^coeff_b`. They are empirical per sensor model,
/// not derived here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSpec {
    /// Unique sensor id, e.g. "MQ-2".
    pub id: String,
    /// Registry name of the ADC the sensor is wired to, e.g. "ads1".
    pub adc: String,
    /// Input channel on that ADC.
    pub channel: Channel,
    /// Manufacturer-specified Rs/Ro ratio in clean air.
    pub clean_air_ratio: f64,
    /// Load resistance of the voltage divider, in kilo-ohms.
    pub load_resistance: f64,
    /// Power-law scale coefficient.
    pub coeff_a: f64,
    /// Power-law exponent, typically negative.
    pub coeff_b: f64,
}

/// Immutable lookup table over the configured sensors.
///
/// Iteration order is configuration order; every pipeline stage sweeps the
/// bench in this order.
#[derive(Debug, Clone, Default)]
pub struct SensorCatalog {
    specs: Vec<SensorSpec>,
    index: HashMap<String, usize>,
}

impl SensorCatalog {
    /// Build the catalog from a spec list, keeping the first occurrence of
    /// each id.
    pub fn new(specs: Vec<SensorSpec>) -> Self {
        let mut catalog = Self {
            specs: Vec::with_capacity(specs.len()),
            index: HashMap::with_capacity(specs.len()),
        };
        for spec in specs {
            if catalog.index.contains_key(&spec.id) {
                warn!("Duplicate catalog entry for {}, keeping the first", spec.id);
                continue;
            }
            catalog.index.insert(spec.id.clone(), catalog.specs.len());
            catalog.specs.push(spec);
        }
        catalog
    }

    /// Look up the spec for a sensor id.
    pub fn spec_for(&self, id: &str) -> Result<&SensorSpec> {
        self.index
            .get(id)
            .map(|&i| &self.specs[i])
            .ok_or_else(|| Error::UnknownSensor(id.to_string()))
    }

    /// Iterate the specs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &SensorSpec> {
        self.specs.iter()
    }

    /// Number of sensors on the bench.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True when no sensors are configured.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
