//! Content-addressed build cache.
//!
//! Entries live at `<root>/<stage>/<key>.<ext>` where the key embeds every
//! semantic input of the stage (logical version plus content hashes). An
//! entry present at its key path is trusted as-is, with no re-verification
//! of its contents; the key already names the bytes it must hold. Nothing
//! is ever evicted.

use crate::atomic::{AtomicDirectory, AtomicFile};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use weft_core::{Result, WeftError};

/// One build's content-addressed cache, rooted at a directory.
#[derive(Debug, Clone)]
pub struct BuildCache {
    root: PathBuf,
}

/// Whether an entry at a key path is usable, absent, or in the way.
enum Presence {
    Hit,
    Miss,
    /// Exists but is not the expected kind of entry, or cannot be
    /// inspected. Treated as a miss and recomputed over.
    Corrupt(WeftError),
}

impl BuildCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry for `key` in `stage`.
    pub fn entry_path(&self, stage: &str, key: &str, ext: Option<&str>) -> PathBuf {
        let name = match ext {
            Some(ext) => format!("{key}.{ext}"),
            None => key.to_string(),
        };
        self.root.join(stage).join(name)
    }

    /// Return the cached file for `key`, producing it on a miss.
    ///
    /// `produce` writes the artifact to the path it is given; the result
    /// only appears at the final path once `produce` returns success.
    pub fn file(
        &self,
        stage: &str,
        key: &str,
        ext: &str,
        produce: impl FnOnce(&Path) -> anyhow::Result<()>,
    ) -> Result<PathBuf> {
        let target = self.entry_path(stage, key, Some(ext));
        match self.presence(&target, true) {
            Presence::Hit => {
                debug!(stage, key, "cache hit");
                return Ok(target);
            }
            Presence::Miss => debug!(stage, key, "cache miss"),
            Presence::Corrupt(err) => {
                warn!(stage, key, %err, "unreadable cache entry, recomputing");
                clear_entry(&target);
            }
        }
        let atomic = AtomicFile::create(&target)?;
        produce(atomic.path())?;
        atomic.commit()
    }

    /// Return the cached directory for `key`, producing it on a miss.
    pub fn directory(
        &self,
        stage: &str,
        key: &str,
        produce: impl FnOnce(&Path) -> anyhow::Result<()>,
    ) -> Result<PathBuf> {
        let target = self.entry_path(stage, key, None);
        match self.presence(&target, false) {
            Presence::Hit => {
                debug!(stage, key, "cache hit");
                return Ok(target);
            }
            Presence::Miss => debug!(stage, key, "cache miss"),
            Presence::Corrupt(err) => {
                warn!(stage, key, %err, "unreadable cache entry, recomputing");
                clear_entry(&target);
            }
        }
        let atomic = AtomicDirectory::create(&target)?;
        produce(atomic.path())?;
        atomic.commit()
    }

    fn presence(&self, target: &Path, want_file: bool) -> Presence {
        let corrupt = |message: String| {
            Presence::Corrupt(WeftError::CacheCorruption {
                path: target.to_path_buf(),
                message,
            })
        };
        match fs::symlink_metadata(target) {
            Ok(meta) if meta.is_file() == want_file && meta.is_dir() == !want_file => {
                Presence::Hit
            }
            Ok(meta) => corrupt(format!(
                "expected a {}, found {:?}",
                if want_file { "file" } else { "directory" },
                meta.file_type()
            )),
            Err(err) if err.kind() == ErrorKind::NotFound => Presence::Miss,
            Err(err) => corrupt(err.to_string()),
        }
    }
}

/// Best-effort removal of an entry of unknown kind.
fn clear_entry(target: &Path) {
    if target.is_dir() {
        let _ = fs::remove_dir_all(target);
    } else {
        let _ = fs::remove_file(target);
    }
}

/// Compose a stage cache key from the logical version and content hashes.
pub fn stage_key(version: &str, hashes: &[String]) -> String {
    let mut key = version.to_string();
    for hash in hashes {
        key.push('-');
        key.push_str(hash);
    }
    key
}
