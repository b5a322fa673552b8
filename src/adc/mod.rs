// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! ADC access - the boundary between the pipeline and the voltage hardware

mod simulator;

#[cfg(feature = "hardware")]
mod ads1115;

pub use simulator::SimulatedBench;

#[cfg(feature = "hardware")]
pub use ads1115::Ads1115Bank;

use crate::catalog::Channel;
use crate::config::Config;
use crate::error::Result;

/// A source of instantaneous voltages, one per (device, channel) input.
///
/// Synchronous and blocking: the pipeline samples one channel at a time and
/// paces itself with plain sleeps, so a stuck read stalls the whole sweep.
pub trait VoltageSource {
    /// Read one instantaneous voltage, in volts, from the named ADC device
    /// and input channel.
    fn read_voltage(&mut self, adc: &str, channel: Channel) -> Result<f64>;
}

/// Open the voltage source the configuration asks for: the simulated bench
/// in demo mode, the real ADC bank otherwise.
pub fn open_source(config: &Config) -> anyhow::Result<Box<dyn VoltageSource>> {
    if config.demo_mode {
        return Ok(Box::new(SimulatedBench::new(config.supply_voltage)));
    }

    #[cfg(feature = "hardware")]
    {
        Ok(Box::new(Ads1115Bank::open(&config.adcs)?))
    }

    #[cfg(not(feature = "hardware"))]
    {
        anyhow::bail!(
            "built without hardware support: rebuild with --features hardware, \
             or set demo_mode = true"
        )
    }
}
