use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::bluetooth::DEFAULT_SCAN_DURATION_SECS;

/// Bluetooth discovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BluetoothConfig {
    /// How long a scan runs before results are returned
    pub scan_duration_secs: u64,
    /// Devices weaker than this (dBm) are ignored. `None` keeps everything.
    pub min_rssi: Option<i16>,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        BluetoothConfig {
            scan_duration_secs: DEFAULT_SCAN_DURATION_SECS,
            min_rssi: None,
        }
    }
}

impl BluetoothConfig {
    pub fn scan_duration(&self) -> Duration {
        Duration::from_secs(self.scan_duration_secs)
    }
}
