//! Constants used by the Bluetooth service
//! Defaults and fixed labels that end up in recorded signals.

/// Scan duration in seconds
pub const DEFAULT_SCAN_DURATION_SECS: u64 = 10;

/// Timeout for waiting on the adapter to become available, in seconds
pub const BLUETOOTH_OPERATION_TIMEOUT_SECS: u64 = 10;

/// Name used for devices that do not advertise one
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

/// Protocol tag stored in the data payload of Bluetooth records
pub const BLUETOOTH_PROTOCOL: &str = "bluetooth";

/// Device class stored when the platform does not report one
pub const UNKNOWN_DEVICE_CLASS: &str = "unknown";
