use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::infrared::{DEFAULT_MAX_INTERVAL_MS, DEFAULT_MIN_INTERVAL_MS};

/// Infrared settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfraredConfig {
    /// Use the simulated receiver. There is no real capture driver yet, so
    /// turning this off leaves infrared unavailable.
    pub simulate: bool,
    /// Shortest wait between simulated signals
    pub min_interval_ms: u64,
    /// Longest wait between simulated signals
    pub max_interval_ms: u64,
}

impl Default for InfraredConfig {
    fn default() -> Self {
        InfraredConfig {
            simulate: true,
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
        }
    }
}

impl InfraredConfig {
    /// Range the simulated receiver draws its waits from. A reversed range is
    /// collapsed onto its lower bound.
    pub fn interval_range(&self) -> (Duration, Duration) {
        let min = self.min_interval_ms;
        let max = self.max_interval_ms.max(min);
        (Duration::from_millis(min), Duration::from_millis(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval_is_two_to_five_seconds() {
        let (min, max) = InfraredConfig::default().interval_range();
        assert_eq!(min, Duration::from_secs(2));
        assert_eq!(max, Duration::from_secs(5));
    }

    #[test]
    fn test_reversed_interval_is_collapsed() {
        let config = InfraredConfig {
            simulate: true,
            min_interval_ms: 300,
            max_interval_ms: 100,
        };
        let (min, max) = config.interval_range();
        assert_eq!(min, max);
    }
}
