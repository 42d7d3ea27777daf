//! File-backed key-value store: one `<key>.json` file per key.

use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{KeyValueStore, StorageError};

const EXTENSION: &str = "json";

/// Stores each key as a JSON file in a directory.
///
/// Writes go to a temporary file that is renamed into place, so a crash
/// mid-write leaves the previous value intact. Keys are percent-encoded
/// into file names, so distinct keys never share a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{EXTENSION}", file_stem(key)))
    }
}

fn file_stem(key: &str) -> Cow<'_, str> {
    urlencoding::encode(key)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match urlencoding::decode(stem) {
                Ok(key) => keys.push(key.into_owned()),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping undecodable store file");
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("ankkor-cart").unwrap(), None);
        store.set("ankkor-cart", r#"{"state":{},"version":1}"#).unwrap();
        assert_eq!(
            store.get("ankkor-cart").unwrap().as_deref(),
            Some(r#"{"state":{},"version":1}"#)
        );

        assert!(store.remove("ankkor-cart").unwrap());
        assert!(!store.remove("ankkor-cart").unwrap());
        assert_eq!(store.get("ankkor-cart").unwrap(), None);
    }

    #[test]
    fn test_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("ankkor-wishlist", "1").unwrap();
        store.set("ankkor-wishlist", "2").unwrap();

        assert_eq!(store.get("ankkor-wishlist").unwrap().as_deref(), Some("2"));
        assert_eq!(store.keys().unwrap(), vec!["ankkor-wishlist".to_string()]);
    }

    #[test]
    fn test_keys_are_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("../escape/attempt", "x").unwrap();

        assert!(dir.path().join("..%2Fescape%2Fattempt.json").exists());
        assert_eq!(store.get("../escape/attempt").unwrap().as_deref(), Some("x"));
        assert_eq!(store.keys().unwrap(), vec!["../escape/attempt".to_string()]);
    }

    #[test]
    fn test_similar_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("ankkor_product_a/b_cache", "slash").unwrap();
        store.set("ankkor_product_a_b_cache", "underscore").unwrap();

        assert_eq!(
            store.get("ankkor_product_a/b_cache").unwrap().as_deref(),
            Some("slash")
        );
        assert_eq!(
            store.get("ankkor_product_a_b_cache").unwrap().as_deref(),
            Some("underscore")
        );
        assert_eq!(store.keys().unwrap().len(), 2);
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("ankkor");
        let store = FileStore::open(&nested).unwrap();
        assert!(store.root().is_dir());
        assert!(store.keys().unwrap().is_empty());
    }
}
