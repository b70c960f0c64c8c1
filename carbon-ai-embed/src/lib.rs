//! # carbon-ai-embed
//!
//! Text embedding for the carbon-accounting knowledge base, built on local
//! ONNX inference via FastEmbed. The model is deliberately pinned: both the
//! index build and every query must embed with the same weights, so the model
//! identity is a crate-level constant rather than a configuration knob.
//!
//! ## Quick Start
//!
//! ```no_run
//! use carbon_ai_embed::{EmbedConfig, EmbeddingProvider, FastEmbedProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = FastEmbedProvider::create(EmbedConfig::default()).await?;
//!
//! let texts = vec!["Scope 1 emissions".to_string(), "carbon offsets".to_string()];
//! let result = provider.embed_texts(&texts).await?;
//!
//! println!("Generated {} embeddings of dimension {}", result.len(), result.dimension);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pinned model
//!
//! `sentence-transformers/all-MiniLM-L6-v2` (fastembed `AllMiniLML6V2`),
//! 384 dimensions, L2-normalized output. Normalized vectors make cosine
//! similarity a plain dot product, which is the metric the retriever uses.
//!
//! ## Memory Usage
//!
//! Embeddings are stored half-precision (f16). Models are cached process-wide
//! so repeated provider construction does not reload the weights.

pub mod config;
pub mod error;
pub mod provider;

// Re-export main types for easy access
pub use config::{EmbedConfig, PINNED_MODEL_DIMENSION, PINNED_MODEL_NAME};
pub use error::{EmbedError, Result};
pub use provider::{
    EmbeddingProvider, EmbeddingResult, FastEmbedProvider, HashEmbeddingProvider,
};
