use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the Tiny-V2 reader treats malformed rows.
///
/// Third-party mapping producers are not always well-formed; in `Lenient`
/// mode a structurally broken row is skipped with a logged warning rather
/// than discarding the whole artifact. `Strict` aborts the parse instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    Strict,
    #[default]
    Lenient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeftConfig {
    pub cache: CacheConfig,
    pub mappings: MappingsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Root directory of the content-addressed build cache.
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingsConfig {
    pub parse_mode: ParseMode,
}

impl Default for WeftConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig { root: PathBuf::from(".weft/cache") },
            mappings: MappingsConfig { parse_mode: ParseMode::Lenient },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = WeftConfig::default();
        assert_eq!(cfg.mappings.parse_mode, ParseMode::Lenient);
        assert_eq!(cfg.cache.root, PathBuf::from(".weft/cache"));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let cfg = WeftConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: WeftConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mappings.parse_mode, cfg.mappings.parse_mode);
        assert_eq!(back.cache.root, cfg.cache.root);
    }

    #[test]
    fn test_parse_mode_lowercase() {
        let json = serde_json::to_string(&ParseMode::Strict).unwrap();
        assert_eq!(json, "\"strict\"");
    }
}
