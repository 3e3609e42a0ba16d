//! Staged, cache-gated remap pipeline for one build session.

pub mod memo;
pub mod pipeline;
pub mod traits;

pub use memo::Memo;
pub use pipeline::{hash_file, PipelineInputs, PipelineSetup, RemapPipeline};
pub use traits::{ArtifactResolver, BytecodeRemapper, Decompiler, Merger};
