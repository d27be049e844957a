//! Cache entry and metadata types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A downloaded artifact held in the cache.
///
/// The file at `filepath` is trusted as complete whenever it exists: it
/// only ever appears there through an atomic rename after a successful
/// download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// URL the artifact was downloaded from.
    pub url: String,
    /// Location of the artifact on disk.
    pub filepath: PathBuf,
}

impl CacheEntry {
    /// Create a new cache entry.
    pub fn new(url: impl Into<String>, filepath: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            filepath: filepath.into(),
        }
    }
}

/// Sidecar metadata written next to each cached artifact.
///
/// Only used for listing; a missing or corrupt sidecar never invalidates
/// the artifact itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Source URL.
    pub url: String,
    /// When this entry was cached.
    pub cached_at: DateTime<Utc>,
    /// Size in bytes.
    pub size_bytes: u64,
}

impl CacheMetadata {
    /// Metadata for an artifact cached now.
    pub fn now(url: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            url: url.into(),
            cached_at: Utc::now(),
            size_bytes,
        }
    }

    /// Get the age of this entry.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.cached_at)
    }
}

/// One artifact as reported by `rigup cache list`.
#[derive(Debug, Clone, Serialize)]
pub struct CachedArtifact {
    /// Location of the artifact on disk.
    pub filepath: PathBuf,
    /// Size on disk.
    pub size_bytes: u64,
    /// Sidecar metadata, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CacheMetadata>,
}
