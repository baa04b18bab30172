//! Platform seam for infrared receivers and emitters

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::core::infrared::types::InfraredSignal;

/// Binding to infrared hardware
#[async_trait]
pub trait InfraredDriver: Send + Sync {
    /// Platform tag written into record metadata
    fn platform(&self) -> &str;

    /// Returns true if infrared capability is present
    async fn probe(&self) -> Result<bool>;

    /// Waits for the next received signal
    async fn receive(&self) -> Result<InfraredSignal>;

    fn has_emitter(&self) -> bool;

    /// Emits `pattern` (microsecond on/off intervals) on a `frequency` Hz carrier
    async fn transmit(&self, frequency: u32, pattern: &[u32]) -> Result<()>;
}

/// Driver for devices without infrared hardware
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInfraredHardware;

#[async_trait]
impl InfraredDriver for NoInfraredHardware {
    fn platform(&self) -> &str {
        std::env::consts::OS
    }

    async fn probe(&self) -> Result<bool> {
        Ok(false)
    }

    async fn receive(&self) -> Result<InfraredSignal> {
        Err(anyhow!("No infrared receiver present"))
    }

    fn has_emitter(&self) -> bool {
        false
    }

    async fn transmit(&self, _frequency: u32, _pattern: &[u32]) -> Result<()> {
        Err(anyhow!("No infrared emitter present"))
    }
}
