//! In-memory storage.

use super::{Storage, StorageError, StorageResult};
use crate::drawing::Drawing;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    drawings: RwLock<HashMap<String, Drawing>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, drawing: &Drawing) -> StorageResult<()> {
        let mut drawings = self.drawings.write().map_err(lock_error)?;
        drawings.insert(id.to_string(), drawing.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<Drawing> {
        let drawings = self.drawings.read().map_err(lock_error)?;
        drawings
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let mut drawings = self.drawings.write().map_err(lock_error)?;
        drawings.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let drawings = self.drawings.read().map_err(lock_error)?;
        Ok(drawings.keys().cloned().collect())
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let drawings = self.drawings.read().map_err(lock_error)?;
        Ok(drawings.contains_key(id))
    }
}
