//! Configuration for the embedding model

use serde::{Deserialize, Serialize};

/// Name of the pinned sentence-embedding model.
///
/// This is fastembed's built-in `AllMiniLML6V2`, i.e.
/// `sentence-transformers/all-MiniLM-L6-v2`. Retrieval quality and test
/// reproducibility depend on the index and every query using exactly this
/// model; the index stores the model identity so a mismatch is detectable.
pub const PINNED_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Embedding dimension of the pinned model.
pub const PINNED_MODEL_DIMENSION: usize = 384;

/// Configuration for embedding generation.
///
/// The model itself is pinned (see [`PINNED_MODEL_NAME`]); the configuration
/// only controls batch size and normalization. Normalization defaults to on
/// so stored vectors are unit length and cosine similarity reduces to a dot
/// product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Maximum batch size for embedding generation
    pub batch_size: usize,
    /// Whether to L2-normalize embeddings
    pub normalize: bool,
}

impl EmbedConfig {
    /// Set the batch size for embedding generation (builder style)
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self { batch_size, ..self }
    }

    /// Set whether to normalize embeddings (builder style)
    pub fn with_normalize(self, normalize: bool) -> Self {
        Self { normalize, ..self }
    }

    /// The pinned model name this configuration applies to.
    pub fn model_name(&self) -> &'static str {
        PINNED_MODEL_NAME
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            batch_size: 16,
            normalize: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbedConfig::default();
        assert_eq!(config.batch_size, 16);
        assert!(config.normalize);
        assert_eq!(config.model_name(), "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_builder_methods() {
        let config = EmbedConfig::default()
            .with_batch_size(32)
            .with_normalize(false);
        assert_eq!(config.batch_size, 32);
        assert!(!config.normalize);
    }
}
