//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, json: &str) -> StorageResult<()> {
        let mut docs = self.documents.write().map_err(lock_error)?;
        docs.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<String> {
        let docs = self.documents.read().map_err(lock_error)?;
        docs.get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut docs = self.documents.write().map_err(lock_error)?;
        docs.remove(key);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.keys().cloned().collect())
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        storage.save("scene", "[]").unwrap();
        assert_eq!(storage.load("scene").unwrap(), "[]");
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = storage.load("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        assert!(!storage.exists("scene").unwrap());
        storage.save("scene", "[]").unwrap();
        assert!(storage.exists("scene").unwrap());
        storage.delete("scene").unwrap();
        assert!(!storage.exists("scene").unwrap());
        storage.delete("scene").unwrap();
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        storage.save("a", "[]").unwrap();
        storage.save("b", "[]").unwrap();

        let mut list = storage.list().unwrap();
        list.sort();
        assert_eq!(list, vec!["a".to_string(), "b".to_string()]);
    }
}
