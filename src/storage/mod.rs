//! Storage Layer
//!
//! SQLite persistence for signal records plus a service layer that contains errors.

mod database;
mod service;

pub use database::{Database, DEFAULT_DATABASE_FILE};
pub use service::StorageService;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Record {id} has unsupported type: {kind}")]
    UnknownKind { id: String, kind: String },
}
