//! SQLite table of signal records
//!
//! Every operation opens its own connection and closes it before returning,
//! on success and on failure alike.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Connection, Row, SqliteConnection};

use crate::model::{SignalKind, SignalProperties, SignalRecord};
use crate::storage::StorageError;

/// File name used when no database path is configured
pub const DEFAULT_DATABASE_FILE: &str = "signal_catcher.db";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS signals (
    id TEXT PRIMARY KEY,
    type TEXT NOT NULL,
    name TEXT NOT NULL,
    timestamp REAL NOT NULL,
    data TEXT,
    properties TEXT
)";

/// Column values derived from a record before it is written
struct EncodedRecord {
    data: Option<String>,
    properties: String,
}

impl EncodedRecord {
    fn new(record: &SignalRecord) -> Result<Self, StorageError> {
        let data = match &record.data {
            Value::Null => None,
            value => Some(serde_json::to_string(value)?),
        };
        let properties = match &record.unparsed_properties {
            Some(raw) => raw.clone(),
            None => record.properties.to_document()?,
        };
        Ok(Self { data, properties })
    }
}

/// Handle to the signals database file
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);
        Ok(SqliteConnection::connect_with(&options).await?)
    }

    async fn release(conn: SqliteConnection) {
        if let Err(e) = conn.close().await {
            warn!("Failed to close database connection: {}", e);
        }
    }

    /// Creates the signals table if it does not exist yet.
    pub async fn setup(&self) -> Result<(), StorageError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(CREATE_TABLE).execute(&mut conn).await;
        Self::release(conn).await;
        result?;
        info!("Database ready at {:?}", self.path);
        Ok(())
    }

    /// Inserts a record and returns its id.
    pub async fn insert(&self, record: &SignalRecord) -> Result<String, StorageError> {
        let encoded = EncodedRecord::new(record)?;
        let mut conn = self.connect().await?;
        let result = Self::insert_with(&mut conn, record, encoded).await;
        Self::release(conn).await;
        result?;
        debug!("Inserted {} record {}", record.kind(), record.id);
        Ok(record.id.clone())
    }

    async fn insert_with(
        conn: &mut SqliteConnection,
        record: &SignalRecord,
        encoded: EncodedRecord,
    ) -> Result<(), StorageError> {
        let mut tx = conn.begin().await?;
        let outcome = sqlx::query(
            "INSERT INTO signals (id, type, name, timestamp, data, properties)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.as_str())
        .bind(record.kind().as_str())
        .bind(record.name.as_str())
        .bind(record.timestamp)
        .bind(encoded.data)
        .bind(encoded.properties)
        .execute(&mut *tx)
        .await;

        match outcome {
            Ok(_) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }

    /// Looks up a record by id.
    pub async fn get(&self, id: &str) -> Result<Option<SignalRecord>, StorageError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("SELECT * FROM signals WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut conn)
            .await;
        Self::release(conn).await;

        match result? {
            Some(row) => Ok(Some(decode_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Lists records, newest first, optionally restricted to one kind.
    ///
    /// Rows whose type is not a known kind are skipped.
    pub async fn list(&self, kind: Option<SignalKind>) -> Result<Vec<SignalRecord>, StorageError> {
        let mut conn = self.connect().await?;
        let result = match kind {
            Some(kind) => {
                sqlx::query("SELECT * FROM signals WHERE type = ? ORDER BY timestamp DESC")
                    .bind(kind.as_str())
                    .fetch_all(&mut conn)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM signals ORDER BY timestamp DESC")
                    .fetch_all(&mut conn)
                    .await
            }
        };
        Self::release(conn).await;

        let mut records = Vec::new();
        for row in result? {
            match decode_row(&row) {
                Ok(record) => records.push(record),
                Err(StorageError::UnknownKind { id, kind }) => {
                    warn!("Skipping record {} with unsupported type {}", id, kind);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    /// Replaces every stored column of `id` with the given record.
    /// Returns false if no such record exists.
    pub async fn update(&self, id: &str, record: &SignalRecord) -> Result<bool, StorageError> {
        let encoded = EncodedRecord::new(record)?;
        let mut conn = self.connect().await?;
        let result = Self::update_with(&mut conn, id, record, encoded).await;
        Self::release(conn).await;
        result
    }

    async fn update_with(
        conn: &mut SqliteConnection,
        id: &str,
        record: &SignalRecord,
        encoded: EncodedRecord,
    ) -> Result<bool, StorageError> {
        let mut tx = conn.begin().await?;
        let outcome = sqlx::query(
            "UPDATE signals
             SET type = ?, name = ?, timestamp = ?, data = ?, properties = ?
             WHERE id = ?",
        )
        .bind(record.kind().as_str())
        .bind(record.name.as_str())
        .bind(record.timestamp)
        .bind(encoded.data)
        .bind(encoded.properties)
        .bind(id)
        .execute(&mut *tx)
        .await;

        match outcome {
            Ok(done) => {
                tx.commit().await?;
                Ok(done.rows_affected() > 0)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }

    /// Deletes a record. Returns true iff a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut conn = self.connect().await?;
        let result = Self::delete_with(&mut conn, id).await;
        Self::release(conn).await;
        result
    }

    async fn delete_with(conn: &mut SqliteConnection, id: &str) -> Result<bool, StorageError> {
        let mut tx = conn.begin().await?;
        let outcome = sqlx::query("DELETE FROM signals WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        match outcome {
            Ok(done) => {
                tx.commit().await?;
                Ok(done.rows_affected() > 0)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }
}

/// Rebuilds a record from a row. Text columns that are not valid JSON are
/// kept as raw strings instead of failing the read.
fn decode_row(row: &SqliteRow) -> Result<SignalRecord, StorageError> {
    let id: String = row.try_get("id")?;
    let kind_text: String = row.try_get("type")?;
    let kind = match kind_text.parse::<SignalKind>() {
        Ok(kind) => kind,
        Err(_) => return Err(StorageError::UnknownKind { id, kind: kind_text }),
    };

    let data = match row.try_get::<Option<String>, _>("data")? {
        Some(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        None => Value::Null,
    };

    let (properties, unparsed_properties) = match row.try_get::<Option<String>, _>("properties")? {
        Some(text) if !text.is_empty() => match SignalProperties::from_document(kind, &text) {
            Ok(properties) => (properties, None),
            Err(e) => {
                debug!("Keeping raw properties of record {}: {}", id, e);
                (SignalProperties::default_for(kind), Some(text))
            }
        },
        _ => (SignalProperties::default_for(kind), None),
    };

    Ok(SignalRecord {
        id,
        name: row.try_get("name")?,
        timestamp: row.try_get("timestamp")?,
        data,
        properties,
        unparsed_properties,
    })
}
