//! Commands
//! This module defines all the operations a presentation layer can invoke.
//! Failures are reported as user-facing messages.

use std::time::Duration;

use log::{error, info, warn};
use serde_json::Value;

use crate::core::bluetooth::BluetoothDevice;
use crate::core::infrared::InfraredSignal;
use crate::events::{AppEvent, EventSink};
use crate::model::{validate, SignalKind, SignalRecord};
use crate::state::AppState;

/// Scans for Bluetooth devices with real-time updates through events
///
/// # Arguments
/// * `app_state` - The application state
/// * `duration` - Scan length, the configured default when `None`
///
/// # Returns
/// The discovered devices. Emits during scanning:
/// - "scan-start" when scanning is started
/// - "device-found" with device details when a device is discovered
/// - "scan-complete" when scanning is finished
pub async fn scan_devices(
    app_state: &AppState,
    duration: Option<Duration>,
) -> Result<Vec<BluetoothDevice>, String> {
    let duration = duration.unwrap_or_else(|| app_state.config.bluetooth.scan_duration());
    let bluetooth_service_arc = app_state.get_bluetooth_service_arc();
    let mut bluetooth_service_guard = bluetooth_service_arc.lock().await;

    if !bluetooth_service_guard.is_available() {
        return Err("Bluetooth is not available".to_string());
    }
    Ok(bluetooth_service_guard.scan(duration).await)
}

/// Records a discovered Bluetooth device as a signal
pub async fn record_device(app_state: &AppState, device: &BluetoothDevice) -> Result<(), String> {
    let bluetooth_service_arc = app_state.get_bluetooth_service_arc();
    let bluetooth_service_guard = bluetooth_service_arc.lock().await;

    if bluetooth_service_guard.record(device).await {
        Ok(())
    } else {
        Err(format!("Failed to record {}", device.name))
    }
}

/// Listens for infrared signals for `duration`
///
/// # Arguments
/// * `app_state` - The application state
/// * `duration` - How long the listening session stays open
/// * `record` - Saves every detected signal when true
///
/// # Returns
/// The detected signals. Emits "listen-start", "signal-detected" for each
/// signal and "listen-stopped" on the application event sink.
pub async fn listen_for(
    app_state: &AppState,
    duration: Duration,
    record: bool,
) -> Result<Vec<InfraredSignal>, String> {
    let infrared_service_arc = app_state.get_infrared_service_arc();
    let mut infrared_service_guard = infrared_service_arc.lock().await;

    let (session_events, mut rx) = EventSink::channel();
    let Some(session) = infrared_service_guard.start_listening(session_events) else {
        return Err("Infrared is not available".to_string());
    };

    let mut detected = Vec::new();
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(event) => forward(app_state, event, &mut detected),
                    None => break,
                }
            }
            _ = &mut deadline => {
                break;
            }
        }
    }

    let forwarded = session.stop().await;
    // whatever the worker sent before stopping is still queued
    while let Ok(event) = rx.try_recv() {
        forward(app_state, event, &mut detected);
    }
    info!("Listening session forwarded {} signal(s)", forwarded);

    if record {
        for signal in &detected {
            if !infrared_service_guard.record(signal).await {
                warn!("Failed to record {}", signal.name);
            }
        }
    }

    Ok(detected)
}

fn forward(app_state: &AppState, event: AppEvent, detected: &mut Vec<InfraredSignal>) {
    if let AppEvent::SignalDetected(signal) = &event {
        detected.push(signal.clone());
    }
    if let Err(e) = app_state.events.emit(event) {
        error!("Failed to forward listening event: {}", e);
    }
}

/// Lists stored records, newest first, optionally only one kind
pub async fn list_records(app_state: &AppState, kind: Option<SignalKind>) -> Vec<SignalRecord> {
    app_state.storage.get_all_records(kind).await
}

async fn find_record(app_state: &AppState, id: &str) -> Result<SignalRecord, String> {
    app_state
        .storage
        .get_record(id)
        .await
        .ok_or_else(|| format!("No signal with id {}", id))
}

/// Detail view text of a stored record
pub async fn show_record(app_state: &AppState, id: &str) -> Result<String, String> {
    Ok(find_record(app_state, id).await?.detail_text())
}

/// Share text of a stored record
pub async fn share_record(app_state: &AppState, id: &str) -> Result<String, String> {
    Ok(find_record(app_state, id).await?.share_text())
}

pub async fn delete_record(app_state: &AppState, id: &str) -> Result<(), String> {
    if app_state.storage.delete_record(id).await {
        Ok(())
    } else {
        Err(format!("Failed to delete signal {}", id))
    }
}

/// Replays a stored record through the service matching its kind
pub async fn transmit_record(app_state: &AppState, id: &str) -> Result<(), String> {
    let record = find_record(app_state, id).await?;

    let transmitted = match record.kind() {
        SignalKind::Bluetooth => {
            let bluetooth_service_arc = app_state.get_bluetooth_service_arc();
            let bluetooth_service_guard = bluetooth_service_arc.lock().await;
            if !bluetooth_service_guard.is_available() {
                return Err("Bluetooth is not available".to_string());
            }
            bluetooth_service_guard.transmit(&record).await
        }
        SignalKind::Infrared => {
            let infrared_service_arc = app_state.get_infrared_service_arc();
            let infrared_service_guard = infrared_service_arc.lock().await;
            if !infrared_service_guard.is_available() {
                return Err("Infrared is not available".to_string());
            }
            infrared_service_guard.transmit(&record).await
        }
    };

    if transmitted {
        info!("Transmitted signal {}", record.name);
        Ok(())
    } else {
        Err(format!("Failed to transmit {}", record.name))
    }
}

/// All stored records as a pretty JSON array of flat records
pub async fn export_records(app_state: &AppState) -> Result<String, String> {
    let records: Vec<Value> = app_state
        .storage
        .get_all_records(None)
        .await
        .iter()
        .map(SignalRecord::to_value)
        .collect();

    serde_json::to_string_pretty(&records).map_err(|e| e.to_string())
}

/// Imports a JSON array of flat records, skipping invalid ones.
/// Returns how many records were saved.
pub async fn import_records(app_state: &AppState, json: &str) -> Result<usize, String> {
    let candidates: Vec<Value> = serde_json::from_str(json).map_err(|e| e.to_string())?;

    let mut saved = 0;
    for candidate in candidates {
        let valid = candidate.as_object().is_some_and(validate);
        if !valid {
            warn!("Skipping invalid record: {}", candidate);
            continue;
        }
        if app_state.storage.save_value(candidate).await {
            saved += 1;
        }
    }
    info!("Imported {} record(s)", saved);
    Ok(saved)
}
