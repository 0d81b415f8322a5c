//! File-backed storage: one `<key>.json` file per item.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use super::{StorageBackend, StorageError};

const FILE_EXTENSION: &str = "json";

// == File Storage ==
/// Stores each item as a file inside `dir`, so cached data survives restarts.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (creating if needed) the storage directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn item_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                format!("key '{}' is not a valid file name", key),
            )));
        }
        Ok(self.dir.join(format!("{}.{}", key, FILE_EXTENSION)))
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.item_path(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.item_path(key)?, value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.item_path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_storage() -> (TempDir, FileStorage) {
        let temp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(temp.path()).unwrap();
        (temp, storage)
    }

    #[test]
    fn test_file_round_trip_and_keys() {
        let (_temp, storage) = temp_storage();
        storage.set_item("erp_cache_clients", "[1,2]").unwrap();

        assert_eq!(
            storage.get_item("erp_cache_clients").unwrap().as_deref(),
            Some("[1,2]")
        );
        assert_eq!(storage.keys().unwrap(), vec!["erp_cache_clients".to_string()]);

        storage.remove_item("erp_cache_clients").unwrap();
        assert!(storage.get_item("erp_cache_clients").unwrap().is_none());
    }

    #[test]
    fn test_file_missing_item_is_none() {
        let (_temp, storage) = temp_storage();
        assert!(storage.get_item("nothing_here").unwrap().is_none());
        assert!(storage.remove_item("nothing_here").is_ok());
    }

    #[test]
    fn test_file_rejects_path_like_keys() {
        let (temp, storage) = temp_storage();
        assert!(storage.set_item("../escape", "x").is_err());
        assert!(storage.set_item(".hidden", "x").is_err());
        assert!(fs::read_dir(temp.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_file_entries_survive_reopen() {
        let (temp, storage) = temp_storage();
        storage.set_item("erp_cache_vehicles", "{\"a\":1}").unwrap();

        let reopened = FileStorage::new(temp.path()).unwrap();
        assert_eq!(
            reopened.get_item("erp_cache_vehicles").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_file_keys_ignore_foreign_files() {
        let (temp, storage) = temp_storage();
        fs::write(temp.path().join("notes.txt"), "x").unwrap();
        storage.set_item("erp_cache_stays", "[]").unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["erp_cache_stays".to_string()]);
    }
}
