//! Storage abstraction for persisted JSON documents (scenes, the library).

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document storage backends.
///
/// Documents are JSON text addressed by a key. Implementations can keep them
/// in memory or on the filesystem.
pub trait Storage: Send + Sync {
    /// Save a document, replacing any previous one under `key`.
    fn save(&self, key: &str, json: &str) -> StorageResult<()>;

    /// Load a document.
    fn load(&self, key: &str) -> StorageResult<String>;

    /// Delete a document. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all document keys.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a document exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}
