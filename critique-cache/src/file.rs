//! Content-addressed on-disk file cache.
//!
//! Layout: `{root}/<fingerprint-hash>.json`, payload = serialized
//! `CacheEntry<T>`. Concurrent writes to the same key are safe: entries are
//! written to a sibling temp path and renamed atomically into place, so no
//! partial file is ever visible to a reader.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::fs;

use crate::errors::CacheResult;
use crate::model::CacheEntry;

#[derive(Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        self.root.join(format!("{digest}.json"))
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<CacheEntry<T>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path).await?;
        let entry: CacheEntry<T> = serde_json::from_slice(&data)?;
        Ok(Some(entry))
    }

    pub async fn save<T: Serialize>(&self, entry: &CacheEntry<T>) -> CacheResult<()> {
        let path = self.path_for(&entry.fingerprint);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec(entry)?;
        let tmp_path = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
        fs::write(&tmp_path, &json).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let entry = CacheEntry::new("fp-1", "value".to_string(), 60);
        cache.save(&entry).await.unwrap();
        let loaded: CacheEntry<String> = cache.load("fp-1").await.unwrap().unwrap();
        assert_eq!(loaded.value, "value");
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let loaded: Option<CacheEntry<String>> = cache.load("nope").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn no_partial_file_left_behind_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let entry = CacheEntry::new("fp-2", 42i32, 60);
        cache.save(&entry).await.unwrap();
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(e) = entries.next_entry().await.unwrap() {
            names.push(e.file_name().into_string().unwrap());
        }
        assert!(names.iter().all(|n| !n.contains("tmp-")));
    }
}
