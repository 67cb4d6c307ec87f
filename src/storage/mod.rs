//! Meal-log persistence
//!
//! The meal log is a single JSON document mapping `YYYY-MM-DD` date keys to
//! arrays of meal records. Records are stored as raw JSON values; nothing
//! beyond "valid JSON" is enforced on their shape.
//!
//! Every save is a read-modify-write of the whole document. Writers
//! serialize behind an async mutex and the file is replaced via a temp file
//! and rename, so concurrent saves cannot drop records and a crash mid-write
//! leaves the previous version intact.

use crate::error::{NutrisageError, Result};
use chrono::{Duration, Local};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Date-keyed meal log persisted as one JSON file
pub struct MealLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl MealLog {
    /// Create a meal log backed by the given file path
    ///
    /// The file is created on first save; a missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Today's date key from the local clock
    pub fn today_key() -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }

    /// Yesterday's date key from the local clock
    pub fn yesterday_key() -> String {
        (Local::now() - Duration::days(1))
            .format("%Y-%m-%d")
            .to_string()
    }

    /// Whether the backing file exists yet
    pub fn file_exists(&self) -> bool {
        self.path.exists()
    }

    async fn load(&self) -> Result<BTreeMap<String, Vec<Value>>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| NutrisageError::Storage(format!("Failed to read meal log: {}", e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| NutrisageError::Storage(format!("Failed to parse meal log: {}", e)).into())
    }

    /// Append a meal record under today's date key
    ///
    /// # Errors
    ///
    /// Returns error on read, serialize, or write failure
    pub async fn append(&self, record: Value) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut log = self.load().await?;
        log.entry(Self::today_key()).or_default().push(record);

        let contents = serde_json::to_string_pretty(&log)
            .map_err(|e| NutrisageError::Storage(format!("Failed to serialize meal log: {}", e)))?;

        // Replace atomically: a crash mid-write must not truncate the log
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, contents)
            .await
            .map_err(|e| NutrisageError::Storage(format!("Failed to write meal log: {}", e)))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| NutrisageError::Storage(format!("Failed to replace meal log: {}", e)))?;

        tracing::debug!("Appended meal record to {}", self.path.display());
        Ok(())
    }

    /// Look up the meal records stored under a date key
    ///
    /// Returns `None` when the date has no entries; a missing file reads as
    /// an empty log.
    pub async fn meals_for(&self, date: &str) -> Result<Option<Vec<Value>>> {
        let _guard = self.lock.lock().await;
        let mut log = self.load().await?;
        Ok(log.remove(date))
    }
}
