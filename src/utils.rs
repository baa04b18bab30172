use anyhow::Result;
use chrono::{Local, TimeZone, Utc};
use log::{error, info};
use std::path::Path;
use tokio::fs;

/// Asynchronously ensures that a directory exists, creating it if it does not.
/// This function is idempotent.
pub async fn ensure_directory_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        if let Err(e) = fs::create_dir_all(path).await {
            error!("Failed to create directory at {:?}: {}", path, e);
            return Err(e.into());
        }
        info!("Created directory at: {:?}", path);
    }
    Ok(())
}

/// Current wall-clock time as seconds since the Unix epoch.
pub fn now_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Formats an epoch timestamp in local time, e.g. `2024-05-01 13:45:10`.
pub fn format_timestamp(timestamp: f64) -> String {
    let micros = (timestamp * 1_000_000.0) as i64;
    match Local.timestamp_micros(micros).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "Unknown".to_string(),
    }
}
