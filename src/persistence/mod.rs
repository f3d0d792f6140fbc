//! Key-value persistence
//!
//! Everything the game keeps between sessions (best score, mute flag,
//! settings, auth token) is a small string under a fixed key. On the web that
//! is LocalStorage; natively and in tests it is an in-memory map.

use std::collections::HashMap;
use std::fmt;

/// Storage failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No backing store (no window, storage disabled by the browser)
    Unavailable,
    /// The store rejected the operation (quota, security error)
    Rejected(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::Rejected(reason) => write!(f, "storage rejected operation: {reason}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// String key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Read and parse a value, treating unparseable data as absent
    fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        Self: Sized,
    {
        Ok(self.get(key)?.and_then(|raw| {
            let parsed = raw.trim().parse().ok();
            if parsed.is_none() {
                log::warn!("Ignoring unparseable value under {key:?}: {raw:?}");
            }
            parsed
        }))
    }
}

/// In-memory store for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// Open the window's LocalStorage
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
fn rejected(err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Rejected(format!("{err:?}"))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(rejected)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(rejected)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("highScore"), Ok(None));

        store.set("highScore", "420").unwrap();
        assert_eq!(store.get("highScore"), Ok(Some("420".to_string())));
        assert_eq!(store.len(), 1);

        store.remove("highScore").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_parsed_ignores_garbage() {
        let mut store = MemoryStore::new();
        store.set("highScore", "not a number").unwrap();
        assert_eq!(store.get_parsed::<u64>("highScore"), Ok(None));

        store.set("highScore", " 77 ").unwrap();
        assert_eq!(store.get_parsed::<u64>("highScore"), Ok(Some(77)));
    }
}
