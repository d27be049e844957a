//! Cache storage implementation.
//!
//! Artifacts live directly under the cache root, named after the URL's
//! basename. Downloads stream into a uniquely named temp file in the same
//! directory and are renamed into place only once complete, so a crashed
//! or failed download never leaves anything that looks like an entry.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::entry::{CacheEntry, CacheMetadata, CachedArtifact};
use crate::error::{RigupError, Result};
use crate::fetch::Fetcher;

/// Prefix of in-flight download files.
const TEMP_PREFIX: &str = ".partial-";

/// Suffix of metadata sidecar files.
const META_SUFFIX: &str = ".meta.json";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._+-]").expect("valid regex"));

/// Derive the cache file name for a URL.
///
/// The basename of the URL path, with query and fragment dropped and
/// unusual characters replaced by `_`. URLs without a usable basename
/// fall back to a hash of the whole URL.
pub fn cache_file_name(url: &str) -> String {
    let basename = reqwest::Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|segments| segments.last().map(str::to_string))
            .filter(|s| !s.is_empty())
    });

    match basename {
        Some(name) => {
            let name = UNSAFE_CHARS.replace_all(&name, "_").into_owned();
            if name.starts_with('.') || name.ends_with(META_SUFFIX) {
                format!("_{}", name)
            } else {
                name
            }
        }
        None => {
            let hash = Sha256::digest(url.as_bytes());
            format!("download-{}", hex::encode(&hash[..16]))
        }
    }
}

/// Storage for downloaded artifacts.
pub struct CacheStore {
    /// Root directory for cache.
    root: PathBuf,
}

impl CacheStore {
    /// Create a new cache store.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the cache directory exists.
    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| RigupError::FileWrite {
            path: self.root.clone(),
            message: format!("cannot create cache directory: {}", e),
        })
    }

    /// Where the artifact for `url` lives (whether or not it exists yet).
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.root.join(cache_file_name(url))
    }

    fn metadata_path(artifact: &Path) -> PathBuf {
        let mut name = artifact.as_os_str().to_owned();
        name.push(META_SUFFIX);
        PathBuf::from(name)
    }

    /// Look up a cached artifact without touching the network.
    pub fn lookup(&self, url: &str) -> Option<CacheEntry> {
        let path = self.entry_path(url);
        path.is_file().then(|| CacheEntry::new(url, path))
    }

    /// Return the cached artifact for `url`, downloading it on a miss.
    ///
    /// Fetch failures surface as [`RigupError::Network`] and leave no entry
    /// behind; the temp file is removed when it is dropped.
    pub fn get_or_fetch(&self, url: &str, fetcher: &dyn Fetcher) -> Result<CacheEntry> {
        if let Some(entry) = self.lookup(url) {
            tracing::debug!("Cache hit for {} at {}", url, entry.filepath.display());
            return Ok(entry);
        }

        self.ensure_dir()?;
        let path = self.entry_path(url);
        let write_failed = |e: std::io::Error| RigupError::FileWrite {
            path: path.clone(),
            message: e.to_string(),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.root)
            .map_err(write_failed)?;

        tracing::debug!("Cache miss for {}, downloading", url);
        let size = fetcher
            .fetch_to(url, temp.as_file_mut())
            .map_err(|e| RigupError::Network {
                url: url.to_string(),
                message: format!("{:#}", e),
            })?;

        temp.as_file().sync_all().map_err(write_failed)?;
        temp.persist(&path).map_err(|e| write_failed(e.error))?;

        let metadata = CacheMetadata::now(url, size);
        if let Err(e) = serde_json::to_string_pretty(&metadata)
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(Self::metadata_path(&path), json))
        {
            tracing::warn!("Could not write cache metadata for {}: {}", url, e);
        }

        Ok(CacheEntry::new(url, path))
    }

    /// Remove the cached artifact for `url`.
    pub fn remove(&self, url: &str) -> Result<bool> {
        let path = self.entry_path(url);
        let meta = Self::metadata_path(&path);

        let mut removed = false;
        if path.exists() {
            fs::remove_file(&path)?;
            removed = true;
        }
        if meta.exists() {
            fs::remove_file(&meta)?;
        }

        Ok(removed)
    }

    /// List all cached artifacts, newest first.
    pub fn list(&self) -> Result<Vec<CachedArtifact>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut artifacts = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if name.starts_with(TEMP_PREFIX) || name.ends_with(META_SUFFIX) || !path.is_file() {
                continue;
            }

            let metadata = fs::read_to_string(Self::metadata_path(&path))
                .ok()
                .and_then(|json| serde_json::from_str::<CacheMetadata>(&json).ok());

            artifacts.push(CachedArtifact {
                size_bytes: entry.metadata().map(|m| m.len()).unwrap_or(0),
                filepath: path,
                metadata,
            });
        }

        artifacts.sort_by(|a, b| {
            let a_time = a.metadata.as_ref().map(|m| m.cached_at);
            let b_time = b.metadata.as_ref().map(|m| m.cached_at);
            b_time
                .cmp(&a_time)
                .then_with(|| a.filepath.cmp(&b.filepath))
        });
        Ok(artifacts)
    }

    /// Clear all cached artifacts and leftover temp files.
    pub fn clear(&self) -> Result<usize> {
        if !self.root.is_dir() {
            return Ok(0);
        }

        let mut count = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            fs::remove_file(&path)?;
            if !name.starts_with(TEMP_PREFIX) && !name.ends_with(META_SUFFIX) {
                count += 1;
            }
        }

        Ok(count)
    }

    /// Get total cache size in bytes.
    pub fn total_size(&self) -> Result<u64> {
        Ok(self.list()?.iter().map(|a| a.size_bytes).sum())
    }
}
