//! Local persistence of the app document.
//!
//! The whole document lives under a single key and is always replaced as a
//! whole. Session values (token, cached user, last sync time) live beside it
//! under their own keys.

mod backend;
mod merge;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use merge::{deep_merge, merge_with_defaults};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::models::AppData;

pub const DATA_KEY: &str = "gains_data";
pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_DATA_KEY: &str = "user_data";
pub const LAST_SYNC_KEY: &str = "last_sync";

/// Keys that survive `clear_app_data`.
pub const SESSION_KEYS: [&str; 3] = [AUTH_TOKEN_KEY, USER_DATA_KEY, LAST_SYNC_KEY];

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Stored document is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
    #[error("Storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub size_in_bytes: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

impl StorageInfo {
    pub fn size_in_kb(&self) -> f64 {
        self.size_in_bytes as f64 / 1024.0
    }
}

/// Handle to the persisted document. Cheap to clone; clones share a backend.
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

impl LocalStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Store backed by files in `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(dir))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// The stored document as raw JSON merged onto the defaults, with every
    /// record kept whether or not the typed model can read it.
    ///
    /// Returns `Ok(None)` when nothing is stored yet.
    pub fn document(&self) -> Result<Option<Map<String, Value>>, StorageError> {
        let Some(raw) = self.backend.read(DATA_KEY)? else {
            return Ok(None);
        };
        let stored: Value = serde_json::from_str(&raw).map_err(StorageError::Corrupt)?;
        if !stored.is_object() {
            return Err(StorageError::InvalidFormat(
                "stored document is not an object".to_string(),
            ));
        }
        match merge_with_defaults(&stored) {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(StorageError::InvalidFormat(
                "merged document is not an object".to_string(),
            )),
        }
    }

    /// Reads the document merged onto the defaults. Records the typed model
    /// cannot read are dropped with a warning.
    ///
    /// Returns `Ok(None)` when nothing is stored yet.
    pub fn load(&self) -> Result<Option<AppData>, StorageError> {
        let Some(document) = self.document()? else {
            return Ok(None);
        };
        serde_json::from_value(Value::Object(document))
            .map(Some)
            .map_err(StorageError::Corrupt)
    }

    /// Current document, or a fresh defaults document when nothing usable is
    /// stored. Read failures are logged, never returned.
    pub fn get(&self) -> AppData {
        match self.load() {
            Ok(Some(data)) => {
                tracing::debug!(
                    workouts = data.workout_history.len(),
                    meals = data.meal_history.len(),
                    supplements = data.custom_supplements.len(),
                    "Loaded stored document"
                );
                data
            }
            Ok(None) => {
                tracing::debug!("No stored document, using defaults");
                AppData::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored document, using defaults");
                AppData::default()
            }
        }
    }

    /// Persists `data` stamped with the current time. Returns the stamp.
    pub fn save(&self, data: &AppData) -> Result<DateTime<Utc>, StorageError> {
        let value = serde_json::to_value(data).map_err(StorageError::Serialize)?;
        let Value::Object(map) = value else {
            return Err(StorageError::InvalidFormat(
                "document did not serialize to an object".to_string(),
            ));
        };
        self.write_document(map)
    }

    /// Persists a raw document as it is, apart from the `lastUpdated` stamp.
    /// Used when the remote copy replaces the local one.
    pub fn replace(&self, document: Map<String, Value>) -> Result<DateTime<Utc>, StorageError> {
        self.write_document(document)
    }

    fn write_document(&self, mut map: Map<String, Value>) -> Result<DateTime<Utc>, StorageError> {
        let now = Utc::now();
        map.insert("lastUpdated".to_string(), Value::String(now.to_rfc3339()));
        let json = serde_json::to_string(&map).map_err(StorageError::Serialize)?;
        self.backend.write(DATA_KEY, &json)?;
        Ok(now)
    }

    /// Removes the persisted document entirely.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(DATA_KEY)
    }

    /// Pretty-printed backup of the stored document, unreadable records
    /// included.
    pub fn export(&self) -> Result<String, StorageError> {
        let mut map = match self.document()? {
            Some(map) => map,
            None => match AppData::defaults() {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        };
        map.insert(
            "exportDate".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        map.insert(
            "version".to_string(),
            Value::String(EXPORT_VERSION.to_string()),
        );
        serde_json::to_string_pretty(&map).map_err(StorageError::Serialize)
    }

    /// Restores a backup produced by [`export`](Self::export), replacing the
    /// current document. Nothing is written unless the backup is valid.
    pub fn import(&self, json: &str) -> Result<AppData, StorageError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| StorageError::InvalidFormat(e.to_string()))?;
        let Value::Object(mut map) = value else {
            return Err(StorageError::InvalidFormat(
                "backup is not a JSON object".to_string(),
            ));
        };
        map.remove("exportDate");
        map.remove("version");

        let Value::Object(document) = merge_with_defaults(&Value::Object(map)) else {
            return Err(StorageError::InvalidFormat(
                "backup is not a JSON object".to_string(),
            ));
        };
        let mut data: AppData = serde_json::from_value(Value::Object(document.clone()))
            .map_err(|e| StorageError::InvalidFormat(e.to_string()))?;
        data.last_updated = Some(self.write_document(document)?);
        Ok(data)
    }

    pub fn info(&self) -> Result<StorageInfo, StorageError> {
        let raw = self.backend.read(DATA_KEY)?;
        let size_in_bytes = raw.as_ref().map(|s| s.len()).unwrap_or(0);
        let last_updated = match self.load() {
            Ok(Some(data)) => data.last_updated,
            _ => None,
        };
        Ok(StorageInfo {
            size_in_bytes,
            last_updated,
        })
    }

    /// Drops everything except the session keys and starts an empty document.
    pub fn clear_app_data(&self) -> Result<(), StorageError> {
        for key in self.backend.keys()? {
            if !SESSION_KEYS.contains(&key.as_str()) {
                self.backend.remove(&key)?;
            }
        }
        self.save(&AppData::default())?;
        tracing::info!("Local app data cleared");
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend.read(key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.write(key, value)
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)
    }
}
