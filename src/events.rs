//! Events sent from background work to the presentation layer
//! Producers hold an [`EventSink`]; whoever renders the UI drains the matching receiver.

use anyhow::{anyhow, Result};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::bluetooth::BluetoothDevice;
use crate::core::infrared::InfraredSignal;
use crate::logging::LogMessage;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum AppEvent {
    ScanStart,
    DeviceFound(BluetoothDevice),
    ScanComplete { device_count: usize },
    ListenStart,
    SignalDetected(InfraredSignal),
    ListenStopped,
    Log(LogMessage),
}

/// Clonable sending half of the event channel
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<AppEvent>>,
}

impl EventSink {
    /// Creates a connected sink and the receiver the presentation layer reads from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that silently discards every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: AppEvent) -> Result<()> {
        match &self.tx {
            Some(tx) => tx
                .send(event)
                .map_err(|e| anyhow!("Event channel closed, dropped {:?}", e.0)),
            None => Ok(()),
        }
    }
}
