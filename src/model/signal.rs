//! Signal record definitions
//! A record is a common envelope (id, name, timestamp, opaque data) plus the
//! attributes of exactly one signal kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::utils::now_timestamp;

/// Keys shared by every flat record, regardless of kind
pub const COMMON_FIELDS: [&str; 5] = ["id", "type", "name", "timestamp", "data"];

/// Flat key carrying properties text that could not be decoded
const RAW_PROPERTIES_FIELD: &str = "properties";

/// Errors raised while turning a flat candidate into a typed record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Record must be a JSON object")]
    NotAnObject,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Unsupported signal type: {0}")]
    UnsupportedKind(String),
    #[error("Unexpected field for {kind} record: {field}")]
    UnexpectedField { kind: SignalKind, field: String },
    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The two kinds of signal the app knows how to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Bluetooth,
    Infrared,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bluetooth => "bluetooth",
            Self::Infrared => "infrared",
        }
    }

    /// Capitalized label used in user-facing text
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bluetooth => "Bluetooth",
            Self::Infrared => "Infrared",
        }
    }

    /// Name given to a record created without one
    pub fn default_name(&self) -> String {
        format!("{} Signal", self.label())
    }

    /// Kind-specific keys a flat record of this kind may carry
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Bluetooth => &["device_name", "address", "rssi"],
            Self::Infrared => &["frequency", "duration", "pattern"],
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bluetooth" => Ok(Self::Bluetooth),
            "infrared" => Ok(Self::Infrared),
            other => Err(RecordError::UnsupportedKind(other.to_string())),
        }
    }
}

fn unknown_device() -> String {
    "Unknown Device".to_string()
}

fn unknown_address() -> String {
    "Unknown".to_string()
}

/// Attributes of a recorded Bluetooth device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BluetoothProperties {
    #[serde(default = "unknown_device")]
    pub device_name: String,
    #[serde(default = "unknown_address")]
    pub address: String,
    /// Signal strength in dBm; 0 when the platform does not report it
    #[serde(default)]
    pub rssi: i16,
}

impl Default for BluetoothProperties {
    fn default() -> Self {
        Self {
            device_name: unknown_device(),
            address: unknown_address(),
            rssi: 0,
        }
    }
}

/// Attributes of a recorded infrared waveform
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InfraredProperties {
    /// Carrier frequency in Hz
    #[serde(default)]
    pub frequency: u32,
    /// Total duration in milliseconds
    #[serde(default)]
    pub duration: f64,
    /// Alternating on/off intervals in microseconds
    #[serde(default)]
    pub pattern: Vec<u32>,
}

/// Kind-specific attributes, tagged by signal kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalProperties {
    Bluetooth(BluetoothProperties),
    Infrared(InfraredProperties),
}

impl SignalProperties {
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::Bluetooth(_) => SignalKind::Bluetooth,
            Self::Infrared(_) => SignalKind::Infrared,
        }
    }

    /// Attributes a record of `kind` carries when nothing else is known
    pub fn default_for(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Bluetooth => Self::Bluetooth(BluetoothProperties::default()),
            SignalKind::Infrared => Self::Infrared(InfraredProperties::default()),
        }
    }

    /// Encodes the attributes (without the kind tag) as a JSON document
    pub fn to_document(&self) -> serde_json::Result<String> {
        match self {
            Self::Bluetooth(props) => serde_json::to_string(props),
            Self::Infrared(props) => serde_json::to_string(props),
        }
    }

    /// Decodes a JSON document written by [`SignalProperties::to_document`]
    pub fn from_document(kind: SignalKind, document: &str) -> serde_json::Result<Self> {
        Ok(match kind {
            SignalKind::Bluetooth => Self::Bluetooth(serde_json::from_str(document)?),
            SignalKind::Infrared => Self::Infrared(serde_json::from_str(document)?),
        })
    }

    fn write_fields(&self, map: &mut Map<String, Value>) {
        match self {
            Self::Bluetooth(props) => {
                map.insert("device_name".into(), Value::from(props.device_name.clone()));
                map.insert("address".into(), Value::from(props.address.clone()));
                map.insert("rssi".into(), Value::from(props.rssi));
            }
            Self::Infrared(props) => {
                map.insert("frequency".into(), Value::from(props.frequency));
                map.insert("duration".into(), Value::from(props.duration));
                map.insert("pattern".into(), Value::from(props.pattern.clone()));
            }
        }
    }
}

/// A stored description of a detected Bluetooth device or infrared waveform
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub id: String,
    pub name: String,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    /// Payload owned by the producing service
    pub data: Value,
    pub properties: SignalProperties,
    /// Raw properties text that could not be decoded when the record was read.
    /// While set, it is written back to storage in place of `properties`.
    pub unparsed_properties: Option<String>,
}

impl SignalRecord {
    /// Creates a record with a fresh id, the default name for its kind and
    /// the current time.
    pub fn new(properties: SignalProperties, data: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: properties.kind().default_name(),
            timestamp: now_timestamp(),
            data,
            properties,
            unparsed_properties: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn kind(&self) -> SignalKind {
        self.properties.kind()
    }

    /// Flattens the record into `{id, type, name, timestamp, data, ...}`
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), Value::from(self.id.clone()));
        map.insert("type".into(), Value::from(self.kind().as_str()));
        map.insert("name".into(), Value::from(self.name.clone()));
        map.insert("timestamp".into(), Value::from(self.timestamp));
        map.insert("data".into(), self.data.clone());
        self.properties.write_fields(&mut map);
        if let Some(raw) = &self.unparsed_properties {
            map.insert(RAW_PROPERTIES_FIELD.into(), Value::from(raw.clone()));
        }
        Value::Object(map)
    }

    /// Builds a typed record from a flat candidate.
    ///
    /// Missing id, name and timestamp are generated; keys that belong to
    /// neither the common envelope nor the record's kind are rejected.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let Value::Object(mut map) = value else {
            return Err(RecordError::NotAnObject);
        };
        let kind = check(&map)?;

        let unparsed_properties = match map.remove(RAW_PROPERTIES_FIELD) {
            Some(Value::String(raw)) => Some(raw),
            Some(_) => {
                return Err(RecordError::UnexpectedField {
                    kind,
                    field: RAW_PROPERTIES_FIELD.to_string(),
                });
            }
            None => None,
        };

        if let Some(field) = map
            .keys()
            .find(|key| !COMMON_FIELDS.contains(&key.as_str()) && !kind.fields().contains(&key.as_str()))
        {
            return Err(RecordError::UnexpectedField {
                kind,
                field: field.clone(),
            });
        }

        let id = match map.remove("id") {
            Some(Value::String(id)) => id,
            Some(other) => other.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        let name = match map.remove("name") {
            Some(Value::String(name)) => name,
            Some(other) => other.to_string(),
            None => kind.default_name(),
        };
        let timestamp = match map.remove("timestamp") {
            Some(value) => serde_json::from_value(value)?,
            None => now_timestamp(),
        };
        let data = map.remove("data").unwrap_or(Value::Null);
        map.remove("type");

        let remaining = Value::Object(map);
        let properties = match kind {
            SignalKind::Bluetooth => SignalProperties::Bluetooth(serde_json::from_value(remaining)?),
            SignalKind::Infrared => SignalProperties::Infrared(serde_json::from_value(remaining)?),
        };

        Ok(Self {
            id,
            name,
            timestamp,
            data,
            properties,
            unparsed_properties,
        })
    }
}

/// Returns true iff the candidate carries `type` and `data`, names a supported
/// kind, and has that kind's required field(s). Values are not range-checked.
pub fn validate(candidate: &Map<String, Value>) -> bool {
    check(candidate).is_ok()
}

fn check(candidate: &Map<String, Value>) -> Result<SignalKind, RecordError> {
    let kind_value = candidate.get("type").ok_or(RecordError::MissingField("type"))?;
    if !candidate.contains_key("data") {
        return Err(RecordError::MissingField("data"));
    }
    let kind = match kind_value.as_str() {
        Some(s) => s.parse::<SignalKind>()?,
        None => return Err(RecordError::UnsupportedKind(kind_value.to_string())),
    };

    match kind {
        SignalKind::Bluetooth if !candidate.contains_key("address") => {
            Err(RecordError::MissingField("address"))
        }
        SignalKind::Infrared
            if !candidate.contains_key("frequency") && !candidate.contains_key("pattern") =>
        {
            Err(RecordError::MissingField("frequency"))
        }
        _ => Ok(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_validate_requires_type_and_data() {
        assert!(!validate(&object(json!({"data": {}, "address": "AA"}))));
        assert!(!validate(&object(json!({"type": "bluetooth", "address": "AA"}))));
        assert!(validate(&object(json!({"type": "bluetooth", "data": {}, "address": "AA"}))));
    }

    #[test]
    fn test_validate_rejects_unknown_kind() {
        assert!(!validate(&object(json!({"type": "zigbee", "data": {}}))));
        assert!(!validate(&object(json!({"type": 7, "data": {}}))));
    }

    #[test]
    fn test_validate_kind_specific_fields() {
        assert!(!validate(&object(json!({"type": "bluetooth", "data": {}}))));
        assert!(!validate(&object(json!({"type": "infrared", "data": {}, "duration": 5}))));
        assert!(validate(&object(json!({"type": "infrared", "data": {}, "frequency": 38000}))));
        assert!(validate(&object(json!({"type": "infrared", "data": {}, "pattern": [1, 2]}))));
        // presence is enough, values are not checked
        assert!(validate(&object(json!({"type": "infrared", "data": null, "frequency": "fast"}))));
    }

    #[test]
    fn test_from_value_fills_defaults() {
        let record = SignalRecord::from_value(json!({
            "type": "bluetooth",
            "data": {},
            "address": "AA:BB:CC:DD:EE:FF",
        }))
        .unwrap();

        assert_eq!(record.kind(), SignalKind::Bluetooth);
        assert_eq!(record.name, "Bluetooth Signal");
        assert!(!record.id.is_empty());
        assert!(record.timestamp > 0.0);
        match record.properties {
            SignalProperties::Bluetooth(props) => {
                assert_eq!(props.device_name, "Unknown Device");
                assert_eq!(props.address, "AA:BB:CC:DD:EE:FF");
                assert_eq!(props.rssi, 0);
            }
            other => panic!("unexpected properties {:?}", other),
        }
    }

    #[test]
    fn test_from_value_rejects_foreign_fields() {
        let err = SignalRecord::from_value(json!({
            "type": "bluetooth",
            "data": {},
            "address": "AA",
            "frequency": 38000,
        }))
        .unwrap_err();
        assert!(matches!(err, RecordError::UnexpectedField { field, .. } if field == "frequency"));
    }

    #[test]
    fn test_raw_properties_survive_flattening() {
        let mut record = SignalRecord::new(
            SignalProperties::default_for(SignalKind::Infrared),
            json!({}),
        );
        record.unparsed_properties = Some("not json".into());

        let flat = record.to_value();
        assert_eq!(flat["properties"], "not json");
        let restored = SignalRecord::from_value(flat).unwrap();
        assert_eq!(restored, record);

        let err = SignalRecord::from_value(json!({
            "type": "infrared",
            "data": {},
            "frequency": 38000,
            "properties": {"frequency": 1},
        }))
        .unwrap_err();
        assert!(matches!(err, RecordError::UnexpectedField { field, .. } if field == "properties"));
    }

    #[test]
    fn test_from_value_rejects_invalid_candidates() {
        assert!(matches!(
            SignalRecord::from_value(json!([1, 2, 3])),
            Err(RecordError::NotAnObject)
        ));
        assert!(matches!(
            SignalRecord::from_value(json!({"type": "infrared", "data": {}})),
            Err(RecordError::MissingField("frequency"))
        ));
        assert!(matches!(
            SignalRecord::from_value(json!({"type": "infrared", "data": {}, "frequency": "fast"})),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn test_flat_value_keeps_every_field() {
        let original = json!({
            "id": "ir-1",
            "type": "infrared",
            "name": "TV Remote Signal",
            "timestamp": 1700000000.5,
            "data": {"protocol": "infrared", "nested": {"a": [1, 2]}},
            "frequency": 38000,
            "duration": 120.0,
            "pattern": [600, 1200, 650, 1100],
        });
        let record = SignalRecord::from_value(original.clone()).unwrap();
        assert_eq!(record.to_value(), original);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [SignalKind::Bluetooth, SignalKind::Infrared] {
            assert_eq!(kind.as_str().parse::<SignalKind>().unwrap(), kind);
        }
        assert!("wifi".parse::<SignalKind>().is_err());
    }

    #[test]
    fn test_properties_document_omits_tag() {
        let props = SignalProperties::Infrared(InfraredProperties {
            frequency: 38000,
            duration: 1.5,
            pattern: vec![1, 2],
        });
        let document = props.to_document().unwrap();
        assert!(!document.contains("\"type\""));
        assert_eq!(
            SignalProperties::from_document(SignalKind::Infrared, &document).unwrap(),
            props
        );
    }
}
