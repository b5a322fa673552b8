// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! MQSense - MQ-series gas sensor bench
//!
//! A calibration, estimation and reporting pipeline for MQ-series gas
//! sensors wired to ADS1115 ADCs:
//! - Clean-air calibration establishing a per-sensor Ro baseline
//! - Power-law ppm estimation from the live resistance ratio
//! - Append-only reading log with min/max/avg summary reports (JSON + CSV)
//! - Simulated bench for development without hardware
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     MQSense Pipeline                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌─────────┐   ┌─────────────┐   ┌───────────────────┐   │
//! │  │   ADC   │ → │ Calibration │ → │    Estimator      │   │
//! │  │  Bank   │   │ (Ro table)  │   │ ppm = A·(Rs/Ro)^B │   │
//! │  └─────────┘   └─────────────┘   └───────────────────┘   │
//! │       ↓               ↓                    ↓             │
//! │  ┌──────────────────────────────────────────────────┐    │
//! │  │              Reading Log (JSON)                  │    │
//! │  └──────────────────────────────────────────────────┘    │
//! │                         ↓                                │
//! │  ┌──────────────────────────────────────────────────┐    │
//! │  │        Summary Report (JSON + CSV)               │    │
//! │  └──────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod adc;
pub mod calibration;
pub mod catalog;
pub mod config;
pub mod error;
pub mod estimator;
pub mod logbook;
pub mod report;
pub mod util;

// Re-exports for convenience
pub use adc::{open_source, SimulatedBench, VoltageSource};
pub use calibration::{CalibrationOutcome, CalibrationTable, Calibrator};
pub use catalog::{Channel, SensorCatalog, SensorSpec};
pub use config::Config;
pub use error::{Error, Result};
pub use estimator::ConcentrationEstimator;
pub use logbook::{ReadingEntry, ReadingLog};
pub use report::{SummaryReport, SummaryStats};

/// MQSense version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// MQSense name
pub const NAME: &str = "MQSense";
