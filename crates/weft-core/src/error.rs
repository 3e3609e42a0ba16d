use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the weft core.
///
/// An unresolvable class reference inside a descriptor is deliberately not
/// represented here: passthrough of the original token is defined behavior,
/// not a failure.
#[derive(Error, Debug)]
pub enum WeftError {
    /// Malformed mapping data that cannot be safely recovered. Fatal to the
    /// whole parse.
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },
    /// A namespace name was requested that the tree does not declare.
    #[error("namespace not found: {name}")]
    NamespaceNotFound { name: String },
    /// A cache path exists but cannot be read as the expected kind of entry.
    #[error("cache entry unreadable: {}: {message}", path.display())]
    CacheCorruption { path: PathBuf, message: String },
    /// A pipeline stage's underlying transformation failed. Never retried.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeftError {
    /// Wrap a collaborator failure as a fatal stage error.
    pub fn stage(stage: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Stage { stage: stage.into(), source }
    }

    /// Format error helper used by parsers.
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format { line, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, WeftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_display() {
        let err = WeftError::format(3, "bad row");
        assert_eq!(err.to_string(), "format error at line 3: bad row");
    }

    #[test]
    fn test_namespace_not_found_display() {
        let err = WeftError::NamespaceNotFound { name: "srg".into() };
        assert_eq!(err.to_string(), "namespace not found: srg");
    }

    #[test]
    fn test_cache_corruption_display() {
        let err = WeftError::CacheCorruption {
            path: PathBuf::from("/cache/remap/k.jar"),
            message: "expected a file, found a directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "cache entry unreadable: /cache/remap/k.jar: expected a file, found a directory"
        );
    }

    #[test]
    fn test_stage_wraps_source() {
        let err = WeftError::stage("remap", anyhow::anyhow!("engine exploded"));
        let msg = err.to_string();
        assert!(msg.contains("remap"));
        assert!(msg.contains("engine exploded"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: WeftError = io.into();
        assert!(matches!(err, WeftError::Io(_)));
    }
}
