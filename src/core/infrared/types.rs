//! Data structures for received infrared signals.

use serde::{Deserialize, Serialize};

use crate::model::InfraredProperties;

/// A signal picked up by an infrared receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraredSignal {
    /// Display name, e.g. "TV Remote Signal"
    pub name: String,
    /// Seconds since the Unix epoch at reception
    pub timestamp: f64,
    /// Carrier frequency in Hz
    pub frequency: u32,
    /// Total duration in milliseconds
    pub duration: f64,
    /// Alternating on/off intervals in microseconds
    pub pattern: Vec<u32>,
    /// Kind of remote the signal is attributed to
    pub remote_type: String,
}

impl InfraredSignal {
    /// Attributes stored on a record of this signal
    pub fn properties(&self) -> InfraredProperties {
        InfraredProperties {
            frequency: self.frequency,
            duration: self.duration,
            pattern: self.pattern.clone(),
        }
    }
}
