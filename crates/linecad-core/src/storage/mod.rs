//! Drawing persistence.

mod file;
mod memory;
mod retry;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use retry::{RetryOp, RetryQueue};

use crate::drawing::Drawing;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Drawing not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend that stores whole drawings under string ids.
///
/// Saving takes the drawing by reference, so a failed save never changes
/// it.
pub trait Storage: Send + Sync {
    fn save(&self, id: &str, drawing: &Drawing) -> StorageResult<()>;

    fn load(&self, id: &str) -> StorageResult<Drawing>;

    /// Deleting a missing drawing is not an error.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// All stored ids, in no particular order.
    fn list(&self) -> StorageResult<Vec<String>>;

    fn exists(&self, id: &str) -> StorageResult<bool>;
}
