// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! Error types for the measurement pipeline

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::Channel;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a raw voltage and a report row.
#[derive(Debug, Error)]
pub enum Error {
    /// A sensor id was requested that the catalog does not know about.
    /// This is a programming/configuration error, not a hardware fault.
    #[error("unknown sensor {0:?}: not present in the catalog")]
    UnknownSensor(String),

    /// A voltage sample at or outside the supply rails. Division by the
    /// sample would produce an infinite or negative resistance.
    #[error("invalid reading from {sensor}: {volts:.3} V is outside the supply rails")]
    InvalidReading {
        /// Sensor that produced the sample.
        sensor: String,
        /// The offending raw voltage.
        volts: f64,
    },

    /// A ppm estimate was requested for a sensor with no stored baseline.
    #[error("no baseline for {0}: run calibration first")]
    MissingCalibration(String),

    /// The hardware layer failed to deliver a sample.
    #[error("ADC read failed on {adc} channel {channel}: {message}")]
    AdcRead {
        /// Registry name of the ADC device.
        adc: String,
        /// Input channel that was being sampled.
        channel: Channel,
        /// Underlying driver message.
        message: String,
    },

    /// The calibration file or the reading log could not be read or written.
    #[error("{}: {source}", path.display())]
    Persistence {
        /// File that failed.
        path: PathBuf,
        /// What went wrong with it.
        #[source]
        source: PersistenceError,
    },

    /// The reading log loaded fine but holds no entries. Valid input for
    /// aggregation, surfaced so callers never mistake it for a load failure.
    #[error("reading log is empty: nothing to report")]
    EmptyLog,
}

impl Error {
    /// Wrap a file-level failure with the path it happened on.
    pub fn persistence(path: &Path, source: impl Into<PersistenceError>) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// Underlying cause of a [`Error::Persistence`] failure.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem-level failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file exists but is not the JSON we expect.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The calibration file carries a schema version this build cannot read.
    #[error("unsupported calibration schema version {0}")]
    UnsupportedVersion(u32),
}
