// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/mqsense

//! Simulated voltage bench for demo/testing

use std::collections::HashMap;

use rand::prelude::*;
use rand_distr::Normal;

use super::VoltageSource;
use crate::catalog::Channel;
use crate::error::Result;

/// Simulates the divider voltages of a warmed-up MQ bench.
///
/// Each (device, channel) pair gets a stable baseline on first read, so
/// repeated sampling of one sensor averages to a consistent value the way a
/// real heated sensor does. On top of that sits slow common drift and
/// per-sample Gaussian noise.
pub struct SimulatedBench {
    supply_voltage: f64,
    rng: rand::rngs::StdRng,
    baselines: HashMap<(String, Channel), f64>,

    // Simulation state
    drift: f64,
    noise: Normal<f64>,
}

impl SimulatedBench {
    /// New bench seeded from OS entropy.
    pub fn new(supply_voltage: f64) -> Self {
        Self::from_rng(supply_voltage, rand::rngs::StdRng::from_entropy())
    }

    /// New bench with a fixed seed, for reproducible runs and tests.
    pub fn with_seed(supply_voltage: f64, seed: u64) -> Self {
        Self::from_rng(supply_voltage, rand::rngs::StdRng::seed_from_u64(seed))
    }

    fn from_rng(supply_voltage: f64, rng: rand::rngs::StdRng) -> Self {
        Self {
            supply_voltage,
            rng,
            baselines: HashMap::new(),
            drift: 0.0,
            noise: Normal::new(0.0, 0.01).unwrap(),
        }
    }

    /// Stable per-input baseline, picked lazily on first access.
    ///
    /// The range keeps simulated dividers well inside the rails, so the
    /// resistance math downstream never sees a clipped sample.
    fn baseline(&mut self, adc: &str, channel: Channel) -> f64 {
        let rng = &mut self.rng;
        *self
            .baselines
            .entry((adc.to_string(), channel))
            .or_insert_with(|| rng.gen_range(0.8..1.8))
    }
}

impl VoltageSource for SimulatedBench {
    fn read_voltage(&mut self, adc: &str, channel: Channel) -> Result<f64> {
        self.drift += self.rng.gen_range(-0.0005..0.0005);

        let baseline = self.baseline(adc, channel);
        let noise = self.rng.sample(self.noise);
        let volts = baseline + self.drift + noise;

        // Keep simulated samples strictly inside the rails.
        Ok(volts.clamp(0.05, self.supply_voltage - 0.05))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_is_stable_per_input() {
        let mut bench = SimulatedBench::with_seed(5.0, 7);

        let first = bench.baseline("ads1", Channel::A0);
        let again = bench.baseline("ads1", Channel::A0);
        let other = bench.baseline("ads2", Channel::A0);

        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[test]
    fn test_samples_stay_inside_the_rails() {
        let mut bench = SimulatedBench::with_seed(5.0, 42);

        for _ in 0..1000 {
            let v = bench.read_voltage("ads1", Channel::A2).unwrap();
            assert!(v > 0.0 && v < 5.0, "sample {v} escaped the rails");
        }
    }

    #[test]
    fn test_samples_cluster_around_the_baseline() {
        let mut bench = SimulatedBench::with_seed(5.0, 3);
        let baseline = bench.baseline("ads2", Channel::A3);

        let mean: f64 = (0..200)
            .map(|_| bench.read_voltage("ads2", Channel::A3).unwrap())
            .sum::<f64>()
            / 200.0;

        assert!((mean - baseline).abs() < 0.1);
    }
}
