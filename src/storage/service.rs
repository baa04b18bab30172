//! Storage service
//! Thin wrapper over [`Database`] that never propagates a failure: every
//! error is logged and reported as `false`, `None` or an empty list.

use std::path::PathBuf;

use log::error;
use serde_json::Value;

use crate::model::{SignalKind, SignalRecord};
use crate::storage::Database;

#[derive(Debug, Clone)]
pub struct StorageService {
    database: Database,
}

impl StorageService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Opens the database at `path`, creating the signals table if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let database = Database::new(path);
        if let Err(e) = database.setup().await {
            error!("Database setup error: {}", e);
        }
        Self::new(database)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Saves a record to storage.
    pub async fn save_record(&self, record: &SignalRecord) -> bool {
        match self.database.insert(record).await {
            Ok(_) => true,
            Err(e) => {
                error!("Error saving record: {}", e);
                false
            }
        }
    }

    /// Validates a flat record and saves it.
    pub async fn save_value(&self, value: Value) -> bool {
        match SignalRecord::from_value(value) {
            Ok(record) => self.save_record(&record).await,
            Err(e) => {
                error!("Rejected record: {}", e);
                false
            }
        }
    }

    /// Retrieves a record by ID.
    pub async fn get_record(&self, id: &str) -> Option<SignalRecord> {
        match self.database.get(id).await {
            Ok(record) => record,
            Err(e) => {
                error!("Error retrieving record: {}", e);
                None
            }
        }
    }

    /// Retrieves all records, newest first, optionally filtered by kind.
    pub async fn get_all_records(&self, kind: Option<SignalKind>) -> Vec<SignalRecord> {
        match self.database.list(kind).await {
            Ok(records) => records,
            Err(e) => {
                error!("Error retrieving records: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn update_record(&self, id: &str, record: &SignalRecord) -> bool {
        match self.database.update(id, record).await {
            Ok(updated) => updated,
            Err(e) => {
                error!("Error updating record: {}", e);
                false
            }
        }
    }

    pub async fn delete_record(&self, id: &str) -> bool {
        match self.database.delete(id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                error!("Error deleting record: {}", e);
                false
            }
        }
    }
}
