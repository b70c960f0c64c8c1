//! carbon-ai-retriever: knowledge-base retrieval for the carbon-accounting assistant
//!
//! This crate loads a directory of plain-text knowledge-base documents,
//! chunks and embeds them, persists the result as an on-disk vector index,
//! and answers similarity queries over it.
//!
//! ## Key Modules
//!
//! - **[`retrieval`]**: Knowledge-base loading, chunking, the SQLite index,
//!   the wholesale index builder, and nearest-neighbor search
//! - **[`system`]**: The [`RetrievalSystem`](system::RetrievalSystem) facade
//!   consumed by the answer composer and the agent layer
//! - **[`config`]** / **[`error`]**: Configuration and the typed error kinds
//!   of the pathway (`LoadError`, `IndexBuildError`, `SearchError`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use carbon_ai_embed::{EmbedConfig, FastEmbedProvider};
//! use carbon_ai_retriever::{RetrievalConfig, RetrievalSystem};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RetrievalConfig::new("knowledge_base");
//! let provider = Arc::new(FastEmbedProvider::create(EmbedConfig::default()).await?);
//! let system = RetrievalSystem::open_or_build(config, provider).await?;
//!
//! let results = system.search("What is Scope 2?", 4).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! knowledge_base/*.txt → Loader → ChunkingStrategy → Embeddings → SQLite index
//!                                                                     ↓
//!                              RetrievalSystem ← Retriever ← cosine similarity scan
//! ```

pub mod config;
pub mod error;
pub mod retrieval;
pub mod system;

pub use config::RetrievalConfig;
pub use error::{IndexBuildError, LoadError, SearchError};
pub use retrieval::knowledge_index::{IndexStats, KnowledgeIndex};
pub use retrieval::search::ScoredChunk;
pub use system::{RetrievalSystem, format_context};
