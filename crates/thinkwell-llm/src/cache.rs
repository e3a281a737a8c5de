//! Response cache
//!
//! Raw provider responses stored on disk, keyed by a fingerprint of the
//! shaped request. Segmentation is rerun on every hit, so a cached entry
//! produces exactly what a live call would.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thinkwell_core::ChatRequest;
use tracing::debug;

/// Cache directory used when no platform cache directory is known
const FALLBACK_CACHE_DIR: &str = ".thinkwell_cache";

const ENTRY_EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    model: String,
    stored_at: u64,
    value: T,
}

/// Fingerprint-keyed on-disk cache
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Create a cache in a directory (created on first write)
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Platform cache directory, e.g. `~/.cache/thinkwell/responses`
    #[must_use]
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("thinkwell").join("responses"))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
    }

    /// Cache directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// SHA-256 hex digest of a request's JSON form
    ///
    /// # Errors
    /// The request cannot be serialized
    pub fn fingerprint(request: &ChatRequest) -> Result<String> {
        let bytes = serde_json::to_vec(request).map_err(|e| Error::Cache(e.to_string()))?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }

    /// Look up an entry
    ///
    /// # Errors
    /// The entry exists but cannot be read or decoded
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.entry_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Cache(format!("Failed to read {:?}: {}", path, e))),
        };

        let entry: CacheEntry<T> = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Cache(format!("Failed to decode {:?}: {}", path, e)))?;
        debug!(key = %key, model = %entry.model, "Cache hit");
        Ok(Some(entry.value))
    }

    /// Store an entry, replacing any previous one
    ///
    /// # Errors
    /// The directory or file cannot be written
    pub async fn put<T: Serialize>(&self, key: &str, model: &str, value: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Cache(format!("Failed to create {:?}: {}", self.dir, e)))?;

        let stored_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let entry = CacheEntry {
            model: model.to_string(),
            stored_at,
            value,
        };
        let bytes = serde_json::to_vec(&entry).map_err(|e| Error::Cache(e.to_string()))?;

        // write then rename so readers never see a partial entry
        let path = self.entry_path(key);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| Error::Cache(format!("Failed to write {:?}: {}", tmp, e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::Cache(format!("Failed to write {:?}: {}", path, e)))?;

        debug!(key = %key, model = %model, "Cached response");
        Ok(())
    }

    /// Remove every entry, returning how many were removed
    ///
    /// # Errors
    /// The directory cannot be listed or an entry cannot be removed
    pub async fn clear(&self) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Error::Cache(format!("Failed to read {:?}: {}", self.dir, e))),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::Cache(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| Error::Cache(format!("Failed to remove {:?}: {}", path, e)))?;
                removed += 1;
            }
        }

        debug!("Cleared {} cache entries from {:?}", removed, self.dir);
        Ok(removed)
    }
}
