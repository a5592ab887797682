//! File-based storage: one JSON file per drawing.

use super::{Storage, StorageError, StorageResult};
use crate::drawing::Drawing;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores drawings as `<id>.json` files in a directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `base_path`, creating the directory if
    /// needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage directory: {e}")))?;
        }
        Ok(Self { base_path })
    }

    /// Storage under the platform's local data directory, e.g.
    /// `~/.local/share/linecad/drawings/` on Linux.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("linecad").join("drawings"))
    }

    /// File path for an id. Characters other than alphanumerics, `-` and
    /// `_` become `_`.
    fn drawing_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, drawing: &Drawing) -> StorageResult<()> {
        let path = self.drawing_path(id);
        let json = drawing
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| StorageError::Io(format!("Failed to write {}: {e}", path.display())))
    }

    fn load(&self, id: &str) -> StorageResult<Drawing> {
        let path = self.drawing_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {e}", path.display())))?;
        Drawing::from_json(&json)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {e}", path.display())))
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.drawing_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {e}", path.display())))?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {e}")))?;
        let ids = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.drawing_path(id).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawables::Line;
    use kurbo::Point;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut drawing = Drawing::with_name("Test Drawing");
        let layer = drawing.current_layer_id();
        drawing
            .add_drawable(layer, Line::new(Point::ZERO, Point::new(10.0, 0.0)))
            .unwrap();

        storage.save("test-drawing", &drawing).unwrap();
        let loaded = storage.load("test-drawing").unwrap();
        assert_eq!(loaded.name, "Test Drawing");
        assert_eq!(loaded.drawable_count(), 1);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(matches!(storage.load("nonexistent"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let drawing = Drawing::new();
        storage.save("one", &drawing).unwrap();
        storage.save("two", &drawing).unwrap();

        let mut list = storage.list().unwrap();
        list.sort();
        assert_eq!(list, vec!["one".to_string(), "two".to_string()]);

        storage.delete("one").unwrap();
        storage.delete("one").unwrap();
        assert!(!storage.exists("one").unwrap());
        assert!(storage.exists("two").unwrap());
    }

    #[test]
    fn test_file_storage_sanitizes_ids() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.save("../escape", &Drawing::new()).unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }
}
