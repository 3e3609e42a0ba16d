//! Shared types for the weft remapping toolchain.

pub mod config;
pub mod error;

pub use config::{CacheConfig, MappingsConfig, ParseMode, WeftConfig};
pub use error::{Result, WeftError};

/// Namespace holding the names the runtime ships with.
pub const NS_OBF: &str = "obf";
/// Namespace of stable intermediate names, constant across releases.
pub const NS_INTERMEDIATE: &str = "intermediate";
/// Namespace of human-readable names.
pub const NS_NAMED: &str = "named";
