//! Constants for the infrared service and its simulated receiver

/// Common IR remote carrier frequencies in Hz
pub const IR_FREQUENCIES: [u32; 4] = [36_000, 38_000, 40_000, 56_000];

/// Remote types a simulated signal is attributed to
pub const REMOTE_TYPES: [&str; 5] = ["TV", "DVD", "AC", "Stereo", "Projector"];

/// Shortest wait between simulated signals, in milliseconds
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 2_000;

/// Longest wait between simulated signals, in milliseconds
pub const DEFAULT_MAX_INTERVAL_MS: u64 = 5_000;

/// Number of on/off pairs in a simulated pattern
pub const PATTERN_PAIRS_MIN: usize = 10;
pub const PATTERN_PAIRS_MAX: usize = 30;

/// On-interval bounds in microseconds
pub const ON_INTERVAL_US: (u32, u32) = (500, 2_000);

/// Off-interval bounds in microseconds
pub const OFF_INTERVAL_US: (u32, u32) = (1_000, 5_000);

/// Platform tag recorded for simulated signals
pub const SIMULATED_PLATFORM: &str = "simulated";

/// Protocol tag stored in the data payload of infrared records
pub const INFRARED_PROTOCOL: &str = "infrared";
