//! Platform seam for Bluetooth adapters

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::info;

use crate::core::bluetooth::types::BluetoothDevice;
use crate::events::EventSink;
use crate::model::BluetoothProperties;

/// Binding to a platform Bluetooth stack
#[async_trait]
pub trait BluetoothDriver: Send + Sync {
    /// Platform tag written into record metadata
    fn platform(&self) -> &str;

    /// Returns true if an adapter exists and is enabled
    async fn probe(&self) -> Result<bool>;

    /// Discovers nearby devices for at most `duration`, emitting each new
    /// device on `events` as it is found.
    async fn discover(&self, duration: Duration, events: &EventSink) -> Result<Vec<BluetoothDevice>>;

    /// Sends to a previously recorded device
    async fn transmit(&self, target: &BluetoothProperties) -> Result<()>;
}

/// Driver for builds without a Bluetooth backend; always unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdapter;

#[async_trait]
impl BluetoothDriver for NoAdapter {
    fn platform(&self) -> &str {
        std::env::consts::OS
    }

    async fn probe(&self) -> Result<bool> {
        info!("No Bluetooth backend compiled in");
        Ok(false)
    }

    async fn discover(&self, _duration: Duration, _events: &EventSink) -> Result<Vec<BluetoothDevice>> {
        Ok(Vec::new())
    }

    async fn transmit(&self, _target: &BluetoothProperties) -> Result<()> {
        Ok(())
    }
}
