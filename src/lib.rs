//! Signal Catcher library
//! Captures Bluetooth devices and infrared signals into a local SQLite store,
//! and lists, shares and replays what was captured.

// Module declarations
pub mod commands;
pub mod config;
pub mod core;
pub mod events;
pub mod logging;
pub mod model;
pub mod state;
pub mod storage;
pub mod utils;
