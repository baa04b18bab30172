pub mod bluetooth_config;
pub mod infrared_config;
pub mod storage_config;

use std::path::Path;

use anyhow::Result;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::config::bluetooth_config::BluetoothConfig;
use crate::config::infrared_config::InfraredConfig;
use crate::config::storage_config::StorageConfig;
use crate::utils::ensure_directory_exists;

const CONFIG_FILE_NAME: &str = "signal_catcher_config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub bluetooth: BluetoothConfig,
    #[serde(default)]
    pub infrared: InfraredConfig,
}

impl AppConfig {
    /// Loads the config from `config_dir`, falling back to defaults when no file exists.
    pub async fn load_config(config_dir: &Path) -> Result<Self> {
        let file_path = config_dir.join(CONFIG_FILE_NAME);
        let file_path_str = file_path.to_string_lossy().into_owned();

        if !file_path.exists() {
            warn!("Config file not found at {:?}, using default.", file_path_str);
            return Ok(Self::default());
        }

        let config_json = fs::read_to_string(file_path).await?;
        let config: Self = serde_json::from_str(&config_json)?;

        info!("Config loaded from {:?}", file_path_str);
        Ok(config)
    }

    /// Loads the config, first writing the defaults to `config_dir` when no
    /// file exists there yet.
    pub async fn load_or_create(config_dir: &Path) -> Result<Self> {
        if config_dir.join(CONFIG_FILE_NAME).exists() {
            return Self::load_config(config_dir).await;
        }

        let config = Self::default();
        config.save_config(config_dir).await?;
        Ok(config)
    }

    /// Saves the current config into `config_dir`.
    pub async fn save_config(&self, config_dir: &Path) -> Result<()> {
        ensure_directory_exists(config_dir).await?;

        let file_path = config_dir.join(CONFIG_FILE_NAME);
        let file_path_str = file_path.to_string_lossy().into_owned();

        let config_json = match serde_json::to_string_pretty(&self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize config to JSON: {}", e);
                return Err(e.into());
            }
        };

        fs::write(&file_path, config_json).await?;
        info!("Config saved to {:?}", file_path_str);
        Ok(())
    }
}
