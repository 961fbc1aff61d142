//! On-disk cache of rendered transcripts, keyed by source URL.
//!
//! Entries live in `<cache dir>/twist/<sha256(url)>.txt` and expire after
//! [`CACHE_TTL`]. Failing to write an entry never fails a dump.

use crate::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::SystemTime;
use twist_core::cache::{cache_key, is_expired, CACHE_EXTENSION, CACHE_TTL};

#[derive(Debug, Clone)]
pub struct TranscriptCache {
    dir: PathBuf,
}

impl TranscriptCache {
    /// Cache in the user's cache directory.
    pub fn open() -> Result<Self> {
        let dir = dirs_next::cache_dir()
            .ok_or_else(|| eyre!("Unable to determine cache directory"))?
            .join("twist");
        Self::at(dir)
    }

    /// Cache rooted at `dir`, created if missing.
    pub fn at(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| eyre!("Failed to create cache directory {}: {}", dir.display(), e))?;
        Ok(Self { dir })
    }

    fn path(&self, url: &str) -> PathBuf {
        self.dir.join(cache_key(url))
    }

    /// Cached transcript for `url`, if any.
    ///
    /// Entries are not checked for age here: [`prune`](Self::prune) runs
    /// before every lookup.
    pub fn read(&self, url: &str) -> Option<String> {
        let path = self.path(url);
        match fs::read_to_string(&path) {
            Ok(data) => {
                log::debug!("cache hit for {url} at {}", path.display());
                Some(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("could not read cache entry {}: {e}", path.display());
                None
            }
        }
    }

    pub fn write(&self, url: &str, data: &str) -> Result<()> {
        let path = self.path(url);
        fs::write(&path, data)
            .map_err(|e| eyre!("Failed to write cache entry {}: {}", path.display(), e))
    }

    /// Delete entries older than [`CACHE_TTL`] at `now`. Returns how many
    /// were removed.
    ///
    /// Only regular `.txt` files are considered; anything else in the
    /// directory is left alone.
    pub fn prune(&self, now: SystemTime) -> Result<usize> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| eyre!("Failed to read cache directory {}: {}", self.dir.display(), e))?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(CACHE_EXTENSION) {
                continue;
            }

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            if is_expired(metadata.modified()?, now, CACHE_TTL) {
                fs::remove_file(&path)
                    .wrap_err_with(|| format!("Failed to remove {}", path.display()))?;
                log::debug!("pruned expired cache entry {}", path.display());
                removed += 1;
            }
        }

        Ok(removed)
    }
}
