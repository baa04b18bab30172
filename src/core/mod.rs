//! Core functionality for Signal Catcher
//! Radio and optical hardware services that feed the signal store.

pub mod bluetooth;
pub mod infrared;

// Re-export commonly used types
pub use bluetooth::BluetoothService;
pub use infrared::InfraredService;
