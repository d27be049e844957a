//! Download cache.
//!
//! Installer artifacts are stored under the cache directory keyed by the
//! basename of their URL, so repeated runs never re-fetch them. Files only
//! appear there through an atomic rename once fully downloaded.

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, CacheMetadata, CachedArtifact};
pub use store::{cache_file_name, CacheStore};

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Get the default cache directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rigup")
        .join("downloads")
}

/// Hex-encoded SHA-256 of a file's contents.
pub fn file_sha256(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
