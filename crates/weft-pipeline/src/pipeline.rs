//! The staged remap pipeline.
//!
//! merge -> remap(obf->intermediate) -> remap(intermediate->named) ->
//! decompile. Every stage is a pure function of its cache key: a hit
//! returns the cached path without touching the collaborator, a miss
//! computes into an atomic temp and commits on success. Failures are fatal
//! to the invocation and never retried; the atomic commit guarantees no
//! partial artifact is ever observable.

use crate::memo::Memo;
use crate::traits::{ArtifactResolver, BytecodeRemapper, Decompiler, Merger};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;
use weft_cache::{stage_key, BuildCache};
use weft_core::{Result, WeftError, NS_INTERMEDIATE, NS_NAMED, NS_OBF};
use weft_mappings::{hash_tree, rename_table, to_hex, MappingTree};

const STAGE_MERGED: &str = "merged";
const STAGE_INTERMEDIATE: &str = "intermediate";
const STAGE_NAMED: &str = "named";
const STAGE_DECOMPILED: &str = "decompiled";

/// The two compiled artifacts a build starts from, already resolved to
/// local paths.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub primary: PathBuf,
    pub secondary: PathBuf,
}

impl PipelineInputs {
    /// Resolve both input coordinates through an artifact resolver.
    pub fn resolve(
        resolver: &dyn ArtifactResolver,
        primary: &str,
        secondary: &str,
    ) -> Result<Self> {
        let resolve = |coordinate: &str| {
            resolver
                .resolve(coordinate)
                .map_err(|err| WeftError::stage("resolve", err))
        };
        Ok(Self { primary: resolve(primary)?, secondary: resolve(secondary)? })
    }
}

/// Everything a pipeline needs besides its collaborators.
#[derive(Debug)]
pub struct PipelineSetup {
    pub cache_root: PathBuf,
    /// Logical version identifier of the build inputs.
    pub version: String,
    pub inputs: PipelineInputs,
    /// Tree carrying obf and intermediate names.
    pub intermediate_tree: MappingTree,
    /// Tree carrying intermediate and named names.
    pub named_tree: MappingTree,
    /// Classpath handed to the decompiler.
    pub classpath: Vec<PathBuf>,
}

/// One build session's remap pipeline.
pub struct RemapPipeline {
    cache: BuildCache,
    memo: Memo,
    version: String,
    inputs: PipelineInputs,
    intermediate_tree: MappingTree,
    named_tree: MappingTree,
    intermediate_hash: String,
    named_hash: String,
    classpath: Vec<PathBuf>,
    merger: Box<dyn Merger>,
    remapper: Box<dyn BytecodeRemapper>,
    decompiler: Box<dyn Decompiler>,
}

impl RemapPipeline {
    pub fn new(
        setup: PipelineSetup,
        merger: Box<dyn Merger>,
        remapper: Box<dyn BytecodeRemapper>,
        decompiler: Box<dyn Decompiler>,
    ) -> Self {
        // The trees are append-only and complete by now; their hashes are
        // fixed for the session.
        let intermediate_hash = to_hex(&hash_tree(&setup.intermediate_tree));
        let named_hash = to_hex(&hash_tree(&setup.named_tree));
        Self {
            cache: BuildCache::new(setup.cache_root),
            memo: Memo::new(),
            version: setup.version,
            inputs: setup.inputs,
            intermediate_tree: setup.intermediate_tree,
            named_tree: setup.named_tree,
            intermediate_hash,
            named_hash,
            classpath: setup.classpath,
            merger,
            remapper,
            decompiler,
        }
    }

    /// Stage 1: the two inputs merged into one artifact.
    pub fn merged(&self) -> Result<PathBuf> {
        let key = stage_key(&self.version, &[]);
        self.memo.get_or_compute(&memo_key(STAGE_MERGED, &key), || {
            debug!(version = %self.version, "merge stage");
            self.cache
                .file(STAGE_MERGED, &key, "jar", |out| {
                    self.merger.merge(&self.inputs.primary, &self.inputs.secondary, out)
                })
                .map_err(|err| as_stage_failure(STAGE_MERGED, err))
        })
    }

    /// Stage 2: the merged artifact renamed obf -> intermediate.
    pub fn intermediate(&self) -> Result<PathBuf> {
        let input = self.merged()?;
        let key = stage_key(&self.version, std::slice::from_ref(&self.intermediate_hash));
        self.memo.get_or_compute(&memo_key(STAGE_INTERMEDIATE, &key), || {
            let renames = rename_table(&self.intermediate_tree, NS_OBF, NS_INTERMEDIATE)?;
            debug!(classes = renames.classes.len(), "intermediate remap stage");
            self.cache
                .file(STAGE_INTERMEDIATE, &key, "jar", |out| {
                    self.remapper.apply(&renames, &input, out)
                })
                .map_err(|err| as_stage_failure(STAGE_INTERMEDIATE, err))
        })
    }

    /// Stage 3: the intermediate artifact renamed intermediate -> named.
    pub fn named(&self) -> Result<PathBuf> {
        let input = self.intermediate()?;
        let hashes = [self.intermediate_hash.clone(), self.named_hash.clone()];
        let key = stage_key(&self.version, &hashes);
        self.memo.get_or_compute(&memo_key(STAGE_NAMED, &key), || {
            let renames = rename_table(&self.named_tree, NS_INTERMEDIATE, NS_NAMED)?;
            debug!(classes = renames.classes.len(), "named remap stage");
            self.cache
                .file(STAGE_NAMED, &key, "jar", |out| self.remapper.apply(&renames, &input, out))
                .map_err(|err| as_stage_failure(STAGE_NAMED, err))
        })
    }

    /// Stage 4: sources and line maps from the external decompiler.
    pub fn decompiled(&self) -> Result<PathBuf> {
        let artifact = self.named()?;
        let key = format!("{}-{}", hash_file(&artifact)?, self.decompiler.id());
        self.memo.get_or_compute(&memo_key(STAGE_DECOMPILED, &key), || {
            debug!(decompiler = %self.decompiler.id(), "decompile stage");
            self.cache
                .directory(STAGE_DECOMPILED, &key, |dir| {
                    self.decompiler.decompile(&artifact, &self.classpath, dir)
                })
                .map_err(|err| as_stage_failure(STAGE_DECOMPILED, err))
        })
    }
}

fn memo_key(stage: &str, key: &str) -> String {
    format!("{stage}:{key}")
}

/// Collaborator errors surface from the cache as `Other`; label them with
/// the stage that failed. Typed errors (bad namespace, format) pass
/// through untouched.
fn as_stage_failure(stage: &'static str, err: WeftError) -> WeftError {
    match err {
        WeftError::Other(source) => WeftError::stage(stage, source),
        WeftError::Io(source) => WeftError::stage(stage, source.into()),
        other => other,
    }
}

/// Hex SHA-256 of a file's contents, for decompile-stage keys.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    let digest: [u8; 32] = hasher.finalize().into();
    Ok(to_hex(&digest))
}
