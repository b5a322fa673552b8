// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! MQSense - MQ-series gas sensor bench
//!
//! Command-line entry point: calibrate the bench in clean air, sweep it for
//! ppm estimates, and roll the reading log up into summary reports.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use mqsense::{
    open_source, Calibrator, CalibrationTable, ConcentrationEstimator, Config, Error, ReadingLog,
    VERSION,
};

/// MQSense - MQ-series gas sensor bench
#[derive(Parser, Debug)]
#[command(name = "mqsense")]
#[command(author = "MQSense Project")]
#[command(version = VERSION)]
#[command(about = "Clean-air calibration, ppm estimation and summary reporting for MQ sensors")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Demo mode with the simulated bench
    #[arg(long)]
    demo: bool,

    /// Data output directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Establish clean-air Ro baselines for every sensor
    Calibrate,

    /// Sweep the bench and append ppm estimates to the reading log
    Read {
        /// Number of passes over the bench
        #[arg(long, default_value = "1")]
        passes: usize,

        /// Pause between passes, in seconds
        #[arg(long, default_value = "5")]
        interval_secs: u64,
    },

    /// Aggregate the reading log into JSON and CSV summary reports
    Report {
        /// Filename stem override for the report files
        #[arg(long)]
        stem: Option<String>,
    },

    /// Calibrate, read and report in one session
    Run {
        /// Number of reading passes between calibration and report
        #[arg(long, default_value = "10")]
        passes: usize,

        /// Pause between passes, in seconds
        #[arg(long, default_value = "5")]
        interval_secs: u64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("MQSense v{} - MQ-series gas sensor bench", VERSION);

    // Load or create configuration
    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Override with command line args
    if args.demo {
        config.demo_mode = true;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    info!("Demo mode: {}", config.demo_mode);

    match args.command {
        Command::Calibrate => calibrate(&config),
        Command::Read {
            passes,
            interval_secs,
        } => read(&config, passes, interval_secs),
        Command::Report { stem } => report(&config, stem),
        Command::Run {
            passes,
            interval_secs,
        } => {
            calibrate(&config)?;
            read(&config, passes, interval_secs)?;
            report(&config, None)
        }
    }
}

/// Run the clean-air sweep and persist whatever baselines it establishes.
fn calibrate(config: &Config) -> Result<()> {
    let catalog = config.catalog();
    let mut source = open_source(config)?;

    let calibrator = Calibrator::new(&config.calibration, config.supply_voltage);
    let outcome = calibrator.calibrate(&catalog, source.as_mut());

    if outcome.table.is_empty() {
        anyhow::bail!("calibration failed for every sensor; nothing was saved");
    }

    for failure in &outcome.failures {
        warn!("No baseline for {}: {}", failure.sensor, failure.error);
    }

    outcome.table.save(&config.calibration_path())?;
    info!(
        "Calibration complete: {}/{} sensors",
        outcome.table.len(),
        catalog.len()
    );
    Ok(())
}

/// Sweep the bench `passes` times, appending each pass to the reading log.
fn read(config: &Config, passes: usize, interval_secs: u64) -> Result<()> {
    let catalog = config.catalog();
    let table = CalibrationTable::load(&config.calibration_path())?;
    let mut source = open_source(config)?;

    let estimator = ConcentrationEstimator::new(&catalog, &table, config.supply_voltage);
    let log = ReadingLog::new(config.log_path());
    let sensor_interval = Duration::from_millis(config.reading.sensor_interval_ms);

    for pass in 0..passes {
        if pass > 0 {
            thread::sleep(Duration::from_secs(interval_secs));
        }

        info!("Reading pass {}/{}", pass + 1, passes);
        let entry = estimator.read_pass(source.as_mut(), sensor_interval);

        if entry.is_empty() {
            warn!("Pass {} produced no readings; nothing logged", pass + 1);
            continue;
        }

        log.append(&entry)?;
    }

    Ok(())
}

/// Aggregate the reading log into the timestamped JSON and CSV reports.
///
/// An empty log is a warning and a clean exit: there is nothing to
/// aggregate, but nothing went wrong either.
fn report(config: &Config, stem: Option<String>) -> Result<()> {
    let log = ReadingLog::new(config.log_path());
    let entries = log.load()?;

    let stem = stem.unwrap_or_else(|| {
        format!(
            "{}_{}",
            config.report.stem,
            Utc::now().format("%Y-%m-%d_%H-%M-%S")
        )
    });

    match mqsense::report::generate(&entries, &config.data_dir, &stem) {
        Ok(paths) => {
            info!("Reports written: {:?}, {:?}", paths.json, paths.csv);
            Ok(())
        }
        Err(Error::EmptyLog) => {
            warn!("Reading log is empty; no report written");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
