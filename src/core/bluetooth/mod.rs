//! Bluetooth functionality
//! This module handles adapter probing, device discovery, recording
//! discovered devices and replaying recorded ones.

mod constants;
mod driver;
#[cfg(feature = "bluest")]
mod scanner;
mod service;
mod types;

// Re-export types that should be publicly accessible
pub use constants::*; // Re-export all constants
pub use driver::{BluetoothDriver, NoAdapter};
#[cfg(feature = "bluest")]
pub use scanner::{extract_mac_address, BluestDriver};
pub use service::BluetoothService;
pub use types::BluetoothDevice;
