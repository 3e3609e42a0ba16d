//! Contracts of the external collaborators the pipeline drives.
//!
//! The pipeline never rewrites bytecode, fetches artifacts or decompiles
//! anything itself; it prepares inputs (rename tables, cache paths) and
//! hands them to these implementations.

use std::path::{Path, PathBuf};
use weft_mappings::RenameTable;

/// Resolves an artifact coordinate to a local, already-verified path.
pub trait ArtifactResolver: Send + Sync {
    fn resolve(&self, coordinate: &str) -> anyhow::Result<PathBuf>;
}

/// Merges two compiled artifacts into one.
pub trait Merger: Send + Sync {
    fn merge(&self, primary: &Path, secondary: &Path, output: &Path) -> anyhow::Result<()>;
}

/// Applies a rename table to a compiled artifact.
pub trait BytecodeRemapper: Send + Sync {
    fn apply(&self, renames: &RenameTable, input: &Path, output: &Path) -> anyhow::Result<()>;
}

/// Decompiles an artifact into sources plus a per-class line map.
pub trait Decompiler: Send + Sync {
    /// Identity and version, part of the decompile stage's cache key.
    fn id(&self) -> String;

    fn decompile(&self, artifact: &Path, classpath: &[PathBuf], output: &Path)
        -> anyhow::Result<()>;
}
