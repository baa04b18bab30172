//! Defines shared data structures for the Bluetooth module.

use serde::{Deserialize, Serialize};

use crate::model::BluetoothProperties;

/// Represents a discovered Bluetooth device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BluetoothDevice {
    /// The name of the device, or "Unknown Device"
    pub name: String,
    /// The address of the device (MAC address on most platforms, may be "N/A" on macOS)
    pub address: String,
    /// Platform-specific unique identifier for the device
    pub id: String,
    /// The signal strength (RSSI); 0 when the platform does not report it
    pub rssi: i16,
    /// Whether the device is paired
    pub is_paired: bool,
    /// Major device class, if the platform reports one
    pub device_class: Option<String>,
}

impl BluetoothDevice {
    /// Creates a new BluetoothDevice instance
    pub fn new(id: String, name: String, address: String, rssi: i16, is_paired: bool) -> Self {
        Self {
            id,
            name,
            address,
            rssi,
            is_paired,
            device_class: None,
        }
    }

    /// Attributes stored on a record of this device
    pub fn properties(&self) -> BluetoothProperties {
        BluetoothProperties {
            device_name: self.name.clone(),
            address: self.address.clone(),
            rssi: self.rssi,
        }
    }
}
