//! Configuration for the retrieval system.

use carbon_ai_embed::EmbedConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the retrieval system.
///
/// Every field has a default matching the shipped knowledge base, so a plain
/// `RetrievalConfig::default()` is a working configuration. An optional
/// `carbon-ai.toml` can override individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Directory holding the knowledge-base text documents. The index
    /// database is stored inside it.
    pub knowledge_base_path: PathBuf,
    /// Maximum chunk length in characters
    pub max_chunk_len: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Default number of chunks returned per query
    pub top_k: usize,
    /// Maximum total length of a formatted context string in characters
    pub max_context_len: usize,
    /// Embedding configuration
    pub embed: EmbedConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            knowledge_base_path: PathBuf::from("knowledge_base"),
            max_chunk_len: carbon_ai_context::DEFAULT_MAX_CHUNK_LEN,
            chunk_overlap: carbon_ai_context::DEFAULT_CHUNK_OVERLAP,
            top_k: 4,
            max_context_len: 2000,
            embed: EmbedConfig::default(),
        }
    }
}

impl RetrievalConfig {
    /// Create a configuration for the given knowledge-base directory with
    /// defaults for everything else.
    pub fn new(knowledge_base_path: impl Into<PathBuf>) -> Self {
        Self {
            knowledge_base_path: knowledge_base_path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file. Missing fields fall back to
    /// their defaults.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Set the top-k default (builder style)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the chunk bounds (builder style)
    pub fn with_chunk_bounds(mut self, max_chunk_len: usize, chunk_overlap: usize) -> Self {
        self.max_chunk_len = max_chunk_len;
        self.chunk_overlap = chunk_overlap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.knowledge_base_path, PathBuf::from("knowledge_base"));
        assert_eq!(config.max_chunk_len, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.max_context_len, 2000);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carbon-ai.toml");
        std::fs::write(&path, "knowledge_base_path = \"kb\"\ntop_k = 6\n").unwrap();

        let config = RetrievalConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.knowledge_base_path, PathBuf::from("kb"));
        assert_eq!(config.top_k, 6);
        assert_eq!(config.max_chunk_len, 1000);
    }
}
