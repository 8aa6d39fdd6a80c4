//! String key/value persistence shaped like browser `localStorage`.
//!
//! The file backend keeps every key in one JSON object and rewrites the whole
//! file on each change. There is no locking: two processes writing the same
//! file can lose each other's updates.

use crate::error::StorageError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const PENDING_EMAIL_KEY: &str = "pendingEmail";
pub const ENTITIES_KEY: &str = "entities";
pub const CURRENT_USER_KEY: &str = "currentUserId";

pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn write_all(&self, items: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_string_pretty(items).map_err(|source| StorageError::Encode {
            key: self.path.display().to_string(),
            source,
        })?;
        let mut file = File::create(&self.path).map_err(|e| self.io_error(e))?;
        file.write_all(body.as_bytes()).map_err(|e| self.io_error(e))?;
        tracing::trace!(path = %self.path.display(), "storage written");
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("sajre-storage-{}", uuid::Uuid::new_v4()))
            .join("storage.json")
    }

    #[test]
    fn memory_storage_behaves_like_local_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        storage.set_item(TOKEN_KEY, "def").unwrap();
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("def"));
        storage.remove_item(TOKEN_KEY).unwrap();
        storage.remove_item(TOKEN_KEY).unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let path = scratch_file();
        let first = FileStorage::new(&path);
        assert_eq!(first.get_item(PENDING_EMAIL_KEY).unwrap(), None);
        first.set_item(PENDING_EMAIL_KEY, "a@b.com").unwrap();
        first.set_item(USER_KEY, r#"{"role":"admin"}"#).unwrap();

        let second = FileStorage::new(&path);
        assert_eq!(second.get_item(PENDING_EMAIL_KEY).unwrap().as_deref(), Some("a@b.com"));
        assert_eq!(second.get_item(USER_KEY).unwrap().as_deref(), Some(r#"{"role":"admin"}"#));

        second.remove_item(PENDING_EMAIL_KEY).unwrap();
        assert_eq!(first.get_item(PENDING_EMAIL_KEY).unwrap(), None);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let path = scratch_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);
        assert!(matches!(storage.get_item(TOKEN_KEY), Err(StorageError::Corrupt { .. })));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
