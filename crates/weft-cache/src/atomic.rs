//! Atomic-commit file and directory primitives.
//!
//! Writers produce into a temporary path co-located with the final target
//! (same filesystem, so committing is a metadata-only rename). An explicit
//! `commit()` publishes the result; dropping the handle without committing
//! discards the temporary. No reader can ever observe a partially written
//! entry at a final path.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use weft_core::Result;

fn temp_sibling(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "entry".to_string());
    Ok(parent.join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4())))
}

/// A file that becomes visible at its target path only on commit.
#[derive(Debug)]
pub struct AtomicFile {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl AtomicFile {
    /// Prepare a temporary sibling of `target`, creating parent directories.
    pub fn create(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let temp = temp_sibling(&target)?;
        Ok(Self { temp, target, committed: false })
    }

    /// The path to write into.
    pub fn path(&self) -> &Path {
        &self.temp
    }

    /// Atomically publish the temporary at the target path.
    pub fn commit(mut self) -> Result<PathBuf> {
        fs::rename(&self.temp, &self.target)?;
        self.committed = true;
        debug!(target = %self.target.display(), "committed atomic file");
        Ok(self.target.clone())
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// An entire directory tree that becomes visible only on commit.
#[derive(Debug)]
pub struct AtomicDirectory {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl AtomicDirectory {
    /// Prepare an empty temporary directory next to `target`.
    pub fn create(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let temp = temp_sibling(&target)?;
        fs::create_dir(&temp)?;
        Ok(Self { temp, target, committed: false })
    }

    /// The directory to build into.
    pub fn path(&self) -> &Path {
        &self.temp
    }

    /// Atomically move the built directory into place.
    ///
    /// If another process committed the same content-addressed target in
    /// the meantime, the rename fails against the existing directory; that
    /// entry holds semantically identical bytes, so the race loser discards
    /// its copy and uses the winner's.
    pub fn commit(mut self) -> Result<PathBuf> {
        match fs::rename(&self.temp, &self.target) {
            Ok(()) => {
                self.committed = true;
                debug!(target = %self.target.display(), "committed atomic directory");
                Ok(self.target.clone())
            }
            Err(err) if self.target.is_dir() => {
                debug!(
                    target = %self.target.display(),
                    "target already committed by another process: {err}"
                );
                Ok(self.target.clone())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for AtomicDirectory {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_dir_all(&self.temp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_commit_publishes() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out/artifact.jar");
        let file = AtomicFile::create(&target).unwrap();
        fs::write(file.path(), b"bytes").unwrap();
        assert!(!target.exists());
        let committed = file.commit().unwrap();
        assert_eq!(committed, target);
        assert_eq!(fs::read(&target).unwrap(), b"bytes");
    }

    #[test]
    fn test_file_drop_discards() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("artifact.jar");
        let temp_path;
        {
            let file = AtomicFile::create(&target).unwrap();
            fs::write(file.path(), b"half-written").unwrap();
            temp_path = file.path().to_path_buf();
        }
        assert!(!target.exists());
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_file_temp_is_sibling() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("deep/nested/a.bin");
        let file = AtomicFile::create(&target).unwrap();
        assert_eq!(file.path().parent(), target.parent());
    }

    #[test]
    fn test_file_commit_overwrites_existing() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("a.bin");
        fs::write(&target, b"old").unwrap();
        let file = AtomicFile::create(&target).unwrap();
        fs::write(file.path(), b"new").unwrap();
        file.commit().unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_directory_commit_publishes() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("sources");
        let dir = AtomicDirectory::create(&target).unwrap();
        fs::write(dir.path().join("Foo.java"), b"class Foo {}").unwrap();
        assert!(!target.exists());
        dir.commit().unwrap();
        assert!(target.join("Foo.java").exists());
    }

    #[test]
    fn test_directory_drop_discards() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("sources");
        let temp_path;
        {
            let dir = AtomicDirectory::create(&target).unwrap();
            fs::write(dir.path().join("Foo.java"), b"x").unwrap();
            temp_path = dir.path().to_path_buf();
        }
        assert!(!target.exists());
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_directory_race_loser_accepts_winner() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("sources");
        let loser = AtomicDirectory::create(&target).unwrap();
        fs::write(loser.path().join("a.txt"), b"loser").unwrap();

        // Another process commits the same key first.
        let winner = AtomicDirectory::create(&target).unwrap();
        fs::write(winner.path().join("a.txt"), b"winner").unwrap();
        winner.commit().unwrap();

        let committed = loser.commit().unwrap();
        assert_eq!(committed, target);
        assert_eq!(fs::read(target.join("a.txt")).unwrap(), b"winner");
    }
}
