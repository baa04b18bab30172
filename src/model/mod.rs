//! Signal record model
//! Typed records, the flat candidate validator and user-facing renderings.

mod share;
mod signal;

pub use share::DATA_PREVIEW_LIMIT;
pub use signal::{
    validate, BluetoothProperties, InfraredProperties, RecordError, SignalKind, SignalProperties,
    SignalRecord, COMMON_FIELDS,
};
