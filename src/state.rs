//! Application state management
//! This module builds the services from config and shares them with the commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use log::info;
use tokio::sync::Mutex;

use crate::config::bluetooth_config::BluetoothConfig;
use crate::config::infrared_config::InfraredConfig;
use crate::config::AppConfig;
use crate::core::bluetooth::{BluetoothDriver, BluetoothService, NoAdapter};
use crate::core::infrared::{InfraredDriver, InfraredService, NoInfraredHardware, SimulatedInfrared};
use crate::events::EventSink;
use crate::storage::StorageService;
use crate::utils::ensure_directory_exists;

/// Global application state
pub struct AppState {
    pub config: AppConfig,
    pub storage: StorageService,
    pub bluetooth_service: Arc<Mutex<BluetoothService>>,
    pub infrared_service: Arc<Mutex<InfraredService>>,
    /// Sink the services report progress through
    pub events: EventSink,
}

impl AppState {
    /// Opens the store under `config_dir` and probes both services.
    pub async fn new(config: AppConfig, config_dir: &Path, events: EventSink) -> Result<Self> {
        ensure_directory_exists(config_dir).await?;

        let database_path = config.storage.resolve_database_path(config_dir);
        info!("Opening signal store at {:?}", database_path);
        let storage = StorageService::open(database_path).await;

        info!("Initializing BluetoothService...");
        let mut bluetooth = BluetoothService::new(
            bluetooth_driver(&config.bluetooth).await,
            storage.clone(),
            events.clone(),
        );
        bluetooth.initialize().await;

        info!("Initializing InfraredService...");
        let mut infrared = InfraredService::new(infrared_driver(&config.infrared), storage.clone());
        infrared.initialize().await;

        Ok(Self {
            config,
            storage,
            bluetooth_service: Arc::new(Mutex::new(bluetooth)),
            infrared_service: Arc::new(Mutex::new(infrared)),
            events,
        })
    }

    pub fn get_bluetooth_service_arc(&self) -> Arc<Mutex<BluetoothService>> {
        self.bluetooth_service.clone()
    }

    pub fn get_infrared_service_arc(&self) -> Arc<Mutex<InfraredService>> {
        self.infrared_service.clone()
    }
}

#[cfg(feature = "bluest")]
async fn bluetooth_driver(config: &BluetoothConfig) -> Arc<dyn BluetoothDriver> {
    use crate::core::bluetooth::BluestDriver;

    match BluestDriver::new(config.min_rssi).await {
        Ok(driver) => Arc::new(driver),
        Err(e) => {
            log::warn!("Bluetooth adapter unavailable: {}", e);
            Arc::new(NoAdapter)
        }
    }
}

#[cfg(not(feature = "bluest"))]
async fn bluetooth_driver(_config: &BluetoothConfig) -> Arc<dyn BluetoothDriver> {
    info!("Built without Bluetooth support");
    Arc::new(NoAdapter)
}

fn infrared_driver(config: &InfraredConfig) -> Arc<dyn InfraredDriver> {
    if config.simulate {
        let (min_interval, max_interval) = config.interval_range();
        Arc::new(SimulatedInfrared::new(min_interval, max_interval))
    } else {
        Arc::new(NoInfraredHardware)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_opens_store_in_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("config");

        let state = AppState::new(AppConfig::default(), &config_dir, EventSink::disabled())
            .await
            .unwrap();

        assert!(config_dir.join("signal_catcher.db").exists());
        assert!(state.get_infrared_service_arc().lock().await.is_available());
        assert!(state.get_bluetooth_service_arc().lock().await.is_initialized());
    }

    #[tokio::test]
    async fn test_simulation_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.infrared.simulate = false;

        let state = AppState::new(config, dir.path(), EventSink::disabled())
            .await
            .unwrap();

        let infrared = state.infrared_service.lock().await;
        assert!(infrared.is_initialized());
        assert!(!infrared.is_available());
    }
}
