//! Human-readable renderings of a record for the detail view and for sharing

use serde_json::Value;

use crate::model::signal::{SignalProperties, SignalRecord};
use crate::utils::format_timestamp;

/// Longest data preview shown in the detail view
pub const DATA_PREVIEW_LIMIT: usize = 200;

impl SignalRecord {
    /// Plain-text summary suitable for a share intent or the clipboard
    pub fn share_text(&self) -> String {
        let mut text = format!(
            "Signal: {}\nType: {}\nRecorded at: {}\n",
            self.name,
            self.kind(),
            format_timestamp(self.timestamp)
        );
        match &self.properties {
            SignalProperties::Bluetooth(props) => {
                text.push_str(&format!(
                    "Device: {}\nAddress: {}",
                    props.device_name, props.address
                ));
            }
            SignalProperties::Infrared(props) => {
                text.push_str(&format!("Frequency: {} Hz", props.frequency));
            }
        }
        text
    }

    /// Full detail view: header, kind-specific properties and a data preview
    pub fn detail_text(&self) -> String {
        let properties = match &self.properties {
            SignalProperties::Bluetooth(props) => format!(
                "Properties:\nDevice Name: {}\nDevice Address: {}\nSignal Strength: {} dBm",
                props.device_name, props.address, props.rssi
            ),
            SignalProperties::Infrared(props) => format!(
                "Properties:\nFrequency: {} Hz\nDuration: {} ms",
                props.frequency, props.duration
            ),
        };

        format!(
            "{}\nType: {}\nRecorded at: {}\n{}\nSignal Data:\n{}",
            self.name,
            self.kind().label(),
            format_timestamp(self.timestamp),
            properties,
            self.data_preview(DATA_PREVIEW_LIMIT)
        )
    }

    /// Pretty-printed payload, cut after `limit` characters
    pub fn data_preview(&self, limit: usize) -> String {
        let rendered = match &self.data {
            Value::String(raw) => raw.clone(),
            Value::Null => String::new(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        };

        if rendered.chars().count() > limit {
            let cut: String = rendered.chars().take(limit).collect();
            format!("{}... (truncated)", cut)
        } else {
            rendered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::signal::{BluetoothProperties, InfraredProperties};
    use serde_json::json;

    fn speaker() -> SignalRecord {
        SignalRecord::new(
            SignalProperties::Bluetooth(BluetoothProperties {
                device_name: "Speaker".into(),
                address: "AA:BB:CC:DD:EE:FF".into(),
                rssi: -60,
            }),
            json!({"protocol": "bluetooth"}),
        )
        .with_name("Living room speaker")
    }

    #[test]
    fn test_share_text_bluetooth() {
        let text = speaker().share_text();
        assert!(text.starts_with("Signal: Living room speaker\nType: bluetooth\nRecorded at: "));
        assert!(text.ends_with("Device: Speaker\nAddress: AA:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn test_share_text_infrared() {
        let record = SignalRecord::new(
            SignalProperties::Infrared(InfraredProperties {
                frequency: 38000,
                duration: 3.0,
                pattern: vec![1000, 2000],
            }),
            json!({}),
        );
        assert!(record.share_text().ends_with("Frequency: 38000 Hz"));
        assert!(record.detail_text().contains("Duration: 3 ms"));
    }

    #[test]
    fn test_detail_text_reports_signal_strength() {
        let text = speaker().detail_text();
        assert!(text.contains("Signal Strength: -60 dBm"));
        assert!(text.contains("\"protocol\": \"bluetooth\""));
    }

    #[test]
    fn test_data_preview_truncates() {
        let mut record = speaker();
        record.data = Value::String("x".repeat(250));
        let preview = record.data_preview(DATA_PREVIEW_LIMIT);
        assert_eq!(preview, format!("{}... (truncated)", "x".repeat(200)));

        record.data = Value::String("short".into());
        assert_eq!(record.data_preview(DATA_PREVIEW_LIMIT), "short");
    }
}
