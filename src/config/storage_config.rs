use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::DEFAULT_DATABASE_FILE;

/// Where recorded signals are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. Relative paths are resolved against the config directory.
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
        }
    }
}

impl StorageConfig {
    pub fn resolve_database_path(&self, config_dir: &Path) -> PathBuf {
        if self.database_path.is_absolute() {
            self.database_path.clone()
        } else {
            config_dir.join(&self.database_path)
        }
    }
}
