//! Simulated infrared receiver
//!
//! No capture hardware is read: after a random wait the receiver makes up a
//! plausible remote-control signal. Records produced from it carry the
//! `"simulated"` platform tag so they can be told apart from real captures.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::core::infrared::constants::{
    DEFAULT_MAX_INTERVAL_MS, DEFAULT_MIN_INTERVAL_MS, IR_FREQUENCIES, OFF_INTERVAL_US,
    ON_INTERVAL_US, PATTERN_PAIRS_MAX, PATTERN_PAIRS_MIN, REMOTE_TYPES, SIMULATED_PLATFORM,
};
use crate::core::infrared::driver::InfraredDriver;
use crate::core::infrared::types::InfraredSignal;
use crate::utils::now_timestamp;

#[derive(Debug, Clone)]
pub struct SimulatedInfrared {
    min_interval: Duration,
    max_interval: Duration,
}

impl Default for SimulatedInfrared {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
            Duration::from_millis(DEFAULT_MAX_INTERVAL_MS),
        )
    }
}

impl SimulatedInfrared {
    pub fn new(min_interval: Duration, max_interval: Duration) -> Self {
        Self {
            min_interval,
            max_interval: max_interval.max(min_interval),
        }
    }

    fn next_wait(&self) -> Duration {
        let min = self.min_interval.as_millis() as u64;
        let max = self.max_interval.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Makes up one remote-control signal.
    pub fn generate_signal() -> InfraredSignal {
        let mut rng = rand::rng();

        let pairs = rng.random_range(PATTERN_PAIRS_MIN..=PATTERN_PAIRS_MAX);
        let mut pattern = Vec::with_capacity(pairs * 2);
        for _ in 0..pairs {
            pattern.push(rng.random_range(ON_INTERVAL_US.0..=ON_INTERVAL_US.1));
            pattern.push(rng.random_range(OFF_INTERVAL_US.0..=OFF_INTERVAL_US.1));
        }

        let frequency = IR_FREQUENCIES.choose(&mut rng).copied().unwrap_or(38_000);
        let duration = pattern.iter().map(|&interval| f64::from(interval)).sum::<f64>() / 1000.0;
        let remote_type = REMOTE_TYPES.choose(&mut rng).copied().unwrap_or("TV");

        InfraredSignal {
            name: format!("{} Remote Signal", remote_type),
            timestamp: now_timestamp(),
            frequency,
            duration,
            pattern,
            remote_type: remote_type.to_string(),
        }
    }
}

#[async_trait]
impl InfraredDriver for SimulatedInfrared {
    fn platform(&self) -> &str {
        SIMULATED_PLATFORM
    }

    async fn probe(&self) -> Result<bool> {
        info!("Using simulated infrared receiver");
        Ok(true)
    }

    async fn receive(&self) -> Result<InfraredSignal> {
        let wait = self.next_wait();
        debug!("Next simulated infrared signal in {:?}", wait);
        tokio::time::sleep(wait).await;
        Ok(Self::generate_signal())
    }

    fn has_emitter(&self) -> bool {
        true
    }

    async fn transmit(&self, frequency: u32, pattern: &[u32]) -> Result<()> {
        info!(
            "Simulating IR transmission: Frequency={}Hz, Pattern={:?}",
            frequency, pattern
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_signal_shape() {
        for _ in 0..50 {
            let signal = SimulatedInfrared::generate_signal();

            assert!(IR_FREQUENCIES.contains(&signal.frequency));
            assert!(REMOTE_TYPES.contains(&signal.remote_type.as_str()));
            assert_eq!(signal.name, format!("{} Remote Signal", signal.remote_type));

            assert_eq!(signal.pattern.len() % 2, 0);
            let pairs = signal.pattern.len() / 2;
            assert!((PATTERN_PAIRS_MIN..=PATTERN_PAIRS_MAX).contains(&pairs));
            for pair in signal.pattern.chunks(2) {
                assert!((ON_INTERVAL_US.0..=ON_INTERVAL_US.1).contains(&pair[0]));
                assert!((OFF_INTERVAL_US.0..=OFF_INTERVAL_US.1).contains(&pair[1]));
            }

            let total: u32 = signal.pattern.iter().sum();
            assert!((signal.duration - f64::from(total) / 1000.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_wait_stays_in_range() {
        let receiver = SimulatedInfrared::new(Duration::from_millis(20), Duration::from_millis(40));
        for _ in 0..100 {
            let wait = receiver.next_wait();
            assert!(wait >= Duration::from_millis(20) && wait <= Duration::from_millis(40));
        }
    }

    #[tokio::test]
    async fn test_receive_waits_then_yields() {
        let receiver = SimulatedInfrared::new(Duration::from_millis(5), Duration::from_millis(10));
        assert!(receiver.probe().await.unwrap());
        let signal = receiver.receive().await.unwrap();
        assert!(!signal.pattern.is_empty());
        assert_eq!(receiver.platform(), "simulated");
    }
}
