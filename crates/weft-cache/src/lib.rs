//! Content-addressed caching with atomic-commit semantics.

pub mod atomic;
pub mod cache;

pub use atomic::{AtomicDirectory, AtomicFile};
pub use cache::{stage_key, BuildCache};
