// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! ADS1115 driver - single-shot reads over Linux I2C

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use tracing::{debug, info};

use super::VoltageSource;
use crate::catalog::Channel;
use crate::config::AdcConfig;
use crate::error::{Error, Result};

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

const CONFIG_OS_SINGLE: u16 = 0x8000;
const CONFIG_MUX_SINGLE_ENDED: u16 = 0x4000;
const CONFIG_PGA_4_096V: u16 = 0x0200;
const CONFIG_MODE_SINGLE: u16 = 0x0100;
const CONFIG_DR_128SPS: u16 = 0x0080;
const CONFIG_COMP_DISABLE: u16 = 0x0003;

/// Full-scale range of the +-4.096 V PGA setting, in volts.
const FULL_SCALE_VOLTS: f64 = 4.096;

/// Worst-case single conversion at 128 SPS is ~7.8 ms; wait a little longer.
const CONVERSION_DELAY: Duration = Duration::from_millis(9);

/// The configured ADS1115 devices, opened once and reused across sweeps.
pub struct Ads1115Bank {
    devices: HashMap<String, LinuxI2CDevice>,
}

impl Ads1115Bank {
    /// Open every device in the registry on the configured I2C bus.
    pub fn open(config: &AdcConfig) -> anyhow::Result<Self> {
        let bus_path = format!("/dev/i2c-{}", config.i2c_bus);
        let mut devices = HashMap::with_capacity(config.addresses.len());

        for (name, &address) in &config.addresses {
            let device = LinuxI2CDevice::new(&bus_path, address)?;
            info!("Opened ADC {} at {}:0x{:02x}", name, bus_path, address);
            devices.insert(name.clone(), device);
        }

        Ok(Self { devices })
    }

    fn convert(device: &mut LinuxI2CDevice, channel: Channel) -> std::result::Result<f64, i2cdev::linux::LinuxI2CError> {
        let config = CONFIG_OS_SINGLE
            | CONFIG_MUX_SINGLE_ENDED
            | ((channel.index() as u16) << 12)
            | CONFIG_PGA_4_096V
            | CONFIG_MODE_SINGLE
            | CONFIG_DR_128SPS
            | CONFIG_COMP_DISABLE;

        // The ADS1115 is big-endian on the wire; smbus words are little-endian.
        device.smbus_write_word_data(REG_CONFIG, config.swap_bytes())?;
        thread::sleep(CONVERSION_DELAY);

        let raw = device.smbus_read_word_data(REG_CONVERSION)?.swap_bytes() as i16;

        // Single-ended inputs cannot go below ground; negative codes are noise.
        let volts = raw.max(0) as f64 * FULL_SCALE_VOLTS / 32768.0;
        debug!("Conversion on {}: raw={} -> {:.4} V", channel, raw, volts);
        Ok(volts)
    }
}

impl VoltageSource for Ads1115Bank {
    fn read_voltage(&mut self, adc: &str, channel: Channel) -> Result<f64> {
        let device = self.devices.get_mut(adc).ok_or_else(|| Error::AdcRead {
            adc: adc.to_string(),
            channel,
            message: "device not in the ADC registry".to_string(),
        })?;

        Self::convert(device, channel).map_err(|e| Error::AdcRead {
            adc: adc.to_string(),
            channel,
            message: e.to_string(),
        })
    }
}
