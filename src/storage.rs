//! JSON key/value storage wrapper.
//!
//! Failures never reach the caller: writes report `false`, reads fall back to
//! the supplied default, and the cause is logged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage quota exceeded ({used} of {quota} bytes)")]
    QuotaExceeded { used: usize, quota: usize },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Raw string key/value store the wrapper sits on.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// In-memory backend with an optional byte quota. The front-end persists its
/// contents through eframe between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryBackend {
    items: BTreeMap<String, String>,
    #[serde(skip)]
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Default::default()
        }
    }

    fn used_with(&self, key: &str, value: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let used = self.used_with(key, &value);
            if used > quota {
                return Err(StorageError::QuotaExceeded { used, quota });
            }
        }
        self.items.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        Ok(())
    }
}

/// Serializes values to JSON text on top of a [`StorageBackend`].
#[derive(Debug, Default)]
pub struct JsonStorage<B> {
    backend: B,
}

impl<B: StorageBackend> JsonStorage<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(err) => {
                log::error!("Erro ao salvar no storage ({key}): {err}");
                return false;
            }
        };
        match self.backend.set_item(key, json) {
            Ok(()) => true,
            Err(err) => {
                log::error!("Erro ao salvar no storage ({key}): {err}");
                false
            }
        }
    }

    /// Reads `key`, returning `default` if it is missing or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    log::error!("Erro ao ler do storage ({key}): {err}");
                    default
                }
            },
            Ok(_) => default,
            Err(err) => {
                log::error!("Erro ao ler do storage ({key}): {err}");
                default
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.backend
            .remove_item(key)
            .inspect_err(|err| log::error!("Erro ao remover do storage ({key}): {err}"))
            .is_ok()
    }

    pub fn clear(&mut self) -> bool {
        self.backend
            .clear()
            .inspect_err(|err| log::error!("Erro ao limpar storage: {err}"))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct CartDraft {
        items: Vec<u32>,
        note: String,
    }

    #[test]
    fn set_then_get_structured_value() {
        let mut storage = JsonStorage::new(MemoryBackend::default());
        let draft = CartDraft {
            items: vec![3, 7],
            note: "sem açúcar".to_owned(),
        };
        assert!(storage.set("cart", &draft));
        let loaded: Option<CartDraft> = storage.get("cart", None);
        assert_eq!(loaded, Some(draft));
    }

    #[test]
    fn missing_key_returns_default() {
        let storage = JsonStorage::new(MemoryBackend::default());
        assert_eq!(storage.get("theme", "claro".to_owned()), "claro");
    }

    #[test]
    fn corrupt_json_returns_default() {
        let mut backend = MemoryBackend::default();
        backend.set_item("count", "{not json".to_owned()).unwrap();
        let storage = JsonStorage::new(backend);
        assert_eq!(storage.get("count", 42u32), 42);
    }

    #[test]
    fn quota_failure_reports_false() {
        let mut storage = JsonStorage::new(MemoryBackend::with_quota(16));
        assert!(storage.set("k", &1));
        assert!(!storage.set("big", &"x".repeat(64)));
        assert_eq!(storage.get("big", String::new()), "");
    }

    #[test]
    fn remove_and_clear() {
        let mut storage = JsonStorage::new(MemoryBackend::default());
        storage.set("a", &1);
        storage.set("b", &2);
        assert!(storage.remove("a"));
        assert_eq!(storage.get("a", 0), 0);
        assert_eq!(storage.get("b", 0), 2);
        assert!(storage.clear());
        assert_eq!(storage.get("b", 0), 0);
    }
}
